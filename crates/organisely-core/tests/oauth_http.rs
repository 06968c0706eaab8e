//! OAuth token endpoint calls against a local mock server.

use mockito::{Matcher, Server};
use organisely_core::{OAuthClient, OAuthConfig, TokenTypeHint};

fn client_for(server: &Server) -> OAuthClient {
    OAuthClient::new(OAuthConfig {
        client_id: "app_1".to_string(),
        client_secret: "shh".to_string(),
        redirect_uri: "http://localhost:3000/callback".to_string(),
        auth_url: format!("{}/oauth/authorize", server.url()),
        token_url: format!("{}/oauth/token", server.url()),
        scopes: vec!["read:habits".to_string()],
    })
}

/// Test: code exchange posts the form and decodes the tokens.
#[tokio::test]
async fn test_exchange_code_returns_tokens() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/oauth/token")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("client_id".into(), "app_1".into()),
            Matcher::UrlEncoded("client_secret".into(), "shh".into()),
            Matcher::UrlEncoded("code".into(), "abc".into()),
            Matcher::UrlEncoded("redirect_uri".into(), "http://localhost:3000/callback".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"access_token": "at_1", "refresh_token": "rt_1", "expires_in": 3600, "token_type": "Bearer", "scope": "read:habits"}"#,
        )
        .create_async()
        .await;

    let response = client_for(&server).exchange_code("abc").await;
    mock.assert_async().await;

    assert!(response.success);
    let tokens = response.data.unwrap();
    assert_eq!(tokens.access_token, "at_1");
    assert_eq!(tokens.refresh_token.as_deref(), Some("rt_1"));
    assert_eq!(tokens.expires_in, 3600);
}

/// Test: a provider error envelope becomes a failure with its description.
#[tokio::test]
async fn test_refresh_error_envelope() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/oauth/token")
        .match_body(Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()))
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "invalid_grant", "error_description": "Refresh token expired"}"#)
        .create_async()
        .await;

    let response = client_for(&server).refresh_token("rt_old").await;
    mock.assert_async().await;

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("invalid_grant"));
    assert_eq!(response.message.as_deref(), Some("Refresh token expired"));
}

/// Test: revocation targets the sibling endpoint with a type hint.
#[tokio::test]
async fn test_revoke_token_posts_hint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/oauth/revoke")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("token".into(), "rt_1".into()),
            Matcher::UrlEncoded("token_type_hint".into(), "refresh_token".into()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let response = client_for(&server)
        .revoke_token("rt_1", TokenTypeHint::RefreshToken)
        .await;
    mock.assert_async().await;

    assert!(response.success);
}

/// Test: validation reports the provider's verdict as data.
#[tokio::test]
async fn test_validate_token_reports_validity() {
    let mut server = Server::new_async().await;
    let _valid = server
        .mock("POST", "/oauth/validate")
        .match_body(Matcher::UrlEncoded("access_token".into(), "good".into()))
        .with_status(200)
        .create_async()
        .await;
    let _invalid = server
        .mock("POST", "/oauth/validate")
        .match_body(Matcher::UrlEncoded("access_token".into(), "bad".into()))
        .with_status(401)
        .create_async()
        .await;

    let client = client_for(&server);
    let good = client.validate_token("good").await;
    let bad = client.validate_token("bad").await;

    assert!(good.success);
    assert_eq!(good.data, Some(true));
    assert!(bad.success);
    assert_eq!(bad.data, Some(false));
}
