//! The transport seam under the request engine.
//!
//! A [`Transport`] performs exactly one HTTP exchange and reports either a
//! completed response (any status) or a connectivity failure. Retries,
//! classification and rate-limit tracking live above it.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use thiserror::Error;

/// One outgoing HTTP call.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Pre-serialized body.
    pub body: Option<String>,
    /// Deadline for this call.
    pub timeout: Duration,
}

impl TransportRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A completed HTTP response with its body fully read.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    /// Header names are stored lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// JSON body with a matching content type.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to obtain any response at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),
}

/// Performs a single HTTP call.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| TransportError::Network(format!("invalid method {}: {e}", request.method)))?;

        let mut http_request = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout);

        for (key, value) in &request.headers {
            http_request = http_request.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            http_request = http_request.body(body);
        }

        let response = http_request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(request.timeout)
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let headers = extract_headers(response.headers());
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(request.timeout)
            } else {
                TransportError::Network(format!("failed to read response body: {e}"))
            }
        })?;

        Ok(TransportResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

/// Extracts headers from a reqwest HeaderMap, skipping non-UTF-8 values.
fn extract_headers(header_map: &HeaderMap) -> HashMap<String, String> {
    let mut headers = HashMap::new();

    for (key, value) in header_map {
        if let Ok(value_str) = value.to_str() {
            headers.insert(key.as_str().to_ascii_lowercase(), value_str.to_string());
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_header_lookup_ignores_case() {
        let response = TransportResponse::new(200).with_header("X-RateLimit-Limit", "100");
        assert_eq!(response.header("x-ratelimit-limit"), Some("100"));
        assert_eq!(response.header("X-RATELIMIT-LIMIT"), Some("100"));
        assert_eq!(response.header("retry-after"), None);
    }

    #[test]
    fn request_header_lookup_ignores_case() {
        let request = TransportRequest {
            method: "GET".to_string(),
            url: "https://example.test/health".to_string(),
            headers: vec![("X-Request-ID".to_string(), "req_1".to_string())],
            body: None,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(request.header("x-request-id"), Some("req_1"));
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(TransportResponse::new(200).is_success());
        assert!(TransportResponse::new(204).is_success());
        assert!(!TransportResponse::new(304).is_success());
        assert!(!TransportResponse::new(429).is_success());
    }

    #[test]
    fn extracted_headers_are_lowercased() {
        let mut map = HeaderMap::new();
        map.insert("Content-Type", "text/plain".parse().unwrap());
        let headers = extract_headers(&map);
        assert_eq!(headers.get("content-type").map(String::as_str), Some("text/plain"));
    }
}
