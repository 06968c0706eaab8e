//! OAuth2 authorization-code helper.
//!
//! Builds the authorization URL and performs the token endpoint calls
//! (exchange, refresh, revoke, validate) as form-encoded POSTs. Every call
//! resolves to an [`ApiResponse`]; HTTP and transport failures become
//! failure envelopes.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::response::ApiResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Seconds.
    pub expires_in: i64,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl OAuthTokenResponse {
    /// Unix timestamp at which the access token expires, counted from `issued_at`.
    pub fn expires_at(&self, issued_at: i64) -> i64 {
        issued_at.saturating_add(self.expires_in)
    }
}

/// Which token `revoke_token` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenTypeHint {
    #[default]
    AccessToken,
    RefreshToken,
}

impl TokenTypeHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenTypeHint::AccessToken => "access_token",
            TokenTypeHint::RefreshToken => "refresh_token",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    http: Client,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: OAuthConfig, http: Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// `auth_url?client_id=..&redirect_uri=..&response_type=code&scope=..[&state=..]`
    pub fn authorization_url(&self, state: Option<&str>) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "));
        if let Some(state) = state.filter(|s| !s.is_empty()) {
            query.append_pair("state", state);
        }
        format!("{}?{}", self.config.auth_url, query.finish())
    }

    /// Trade an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> ApiResponse<OAuthTokenResponse> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        self.token_request(&self.config.token_url, &form, "Token exchange failed")
            .await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> ApiResponse<OAuthTokenResponse> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];
        self.token_request(&self.config.token_url, &form, "Token refresh failed")
            .await
    }

    /// POST to the revoke endpoint (token URL with `/token` replaced by `/revoke`).
    pub async fn revoke_token(&self, token: &str, hint: TokenTypeHint) -> ApiResponse<()> {
        let url = self.sibling_endpoint("/revoke");
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("token", token),
            ("token_type_hint", hint.as_str()),
        ];

        match self.http.post(&url).form(&form).send().await {
            Ok(response) if response.status().is_success() => ApiResponse::succeeded(),
            Ok(response) => {
                let status = response.status().as_u16();
                let body: Value = response.json().await.unwrap_or(Value::Null);
                warn!(status, "Token revocation rejected");
                ApiResponse::failure(provider_error(&body, status))
            }
            Err(e) => {
                warn!("Token revocation failed: {}", e);
                ApiResponse::failure(e.to_string())
            }
        }
    }

    /// Ask the provider whether `access_token` is still valid. `data` is the
    /// answer; `success` is false only when the provider could not be reached.
    pub async fn validate_token(&self, access_token: &str) -> ApiResponse<bool> {
        let url = self.sibling_endpoint("/validate");
        match self
            .http
            .post(&url)
            .form(&[("access_token", access_token)])
            .send()
            .await
        {
            Ok(response) => ApiResponse::ok(response.status().is_success()),
            Err(e) => {
                warn!("Token validation failed: {}", e);
                ApiResponse::failure(e.to_string())
            }
        }
    }

    fn sibling_endpoint(&self, path: &str) -> String {
        self.config.token_url.replacen("/token", path, 1)
    }

    async fn token_request(
        &self,
        url: &str,
        form: &[(&str, &str)],
        fallback: &str,
    ) -> ApiResponse<OAuthTokenResponse> {
        let response = match self.http.post(url).form(form).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("{}: {}", fallback, e);
                return ApiResponse::failure(e.to_string());
            }
        };

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status = status.as_u16(), "{}: unreadable body: {}", fallback, e);
                return ApiResponse::failure(if status.is_success() {
                    format!("{fallback}: {e}")
                } else {
                    format!("HTTP {}", status.as_u16())
                });
            }
        };

        if !status.is_success() {
            debug!(status = status.as_u16(), "Token endpoint returned an error");
            let description = body
                .get("error_description")
                .and_then(Value::as_str)
                .map(str::to_string);
            return ApiResponse::failure(provider_error(&body, status.as_u16()))
                .with_message(description);
        }

        match serde_json::from_value::<OAuthTokenResponse>(body) {
            Ok(tokens) => ApiResponse::ok(tokens),
            Err(e) => ApiResponse::failure(format!("{fallback}: {e}")),
        }
    }
}

/// Body `error`, else `HTTP <status>`.
fn provider_error(body: &Value, status: u16) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig {
            client_id: "client 1".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:3000/callback".to_string(),
            auth_url: "https://organisely.com/oauth/authorize".to_string(),
            token_url: "https://organisely.com/oauth/token".to_string(),
            scopes: vec!["read:habits".to_string(), "write:habits".to_string()],
        }
    }

    #[test]
    fn authorization_url_encodes_parameters() {
        let client = OAuthClient::new(config());
        let url = client.authorization_url(Some("xyz"));
        assert!(url.starts_with("https://organisely.com/oauth/authorize?"));
        assert!(url.contains("client_id=client+1"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fcallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=read%3Ahabits+write%3Ahabits"));
        assert!(url.ends_with("&state=xyz"));
    }

    #[test]
    fn authorization_url_omits_empty_state() {
        let client = OAuthClient::new(config());
        assert!(!client.authorization_url(None).contains("state="));
        assert!(!client.authorization_url(Some("")).contains("state="));
    }

    #[test]
    fn sibling_endpoints_replace_token_segment() {
        let client = OAuthClient::new(config());
        assert_eq!(
            client.sibling_endpoint("/revoke"),
            "https://organisely.com/oauth/revoke"
        );
        assert_eq!(
            client.sibling_endpoint("/validate"),
            "https://organisely.com/oauth/validate"
        );
    }

    #[test]
    fn provider_error_falls_back_to_status() {
        assert_eq!(
            provider_error(&serde_json::json!({"error": "invalid_grant"}), 400),
            "invalid_grant"
        );
        assert_eq!(provider_error(&Value::Null, 502), "HTTP 502");
    }

    #[test]
    fn expiry_is_offset_from_issue_time() {
        let tokens = OAuthTokenResponse {
            access_token: "at".to_string(),
            refresh_token: None,
            expires_in: 3600,
            token_type: "Bearer".to_string(),
            scope: None,
            user_id: None,
        };
        assert_eq!(tokens.expires_at(1_000), 4_600);
    }
}
