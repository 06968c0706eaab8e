//! The request engine: header assembly, attempts, backoff.

use std::time::Duration;

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, debug_span, error, warn, Instrument};

use crate::config::RetryPolicy;
use crate::constants::{headers, SDK_VERSION};
use crate::error::{ApiError, ErrorCode};
use crate::response::ApiResponse;
use crate::transport::{Transport, TransportError, TransportRequest};

use super::body::ResponseBody;
use super::classify;
use super::OrganiselyClient;

const REQUEST_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Per-call settings. Unset overrides fall back to the client's policy.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: String,
    /// Pre-serialized JSON body.
    pub body: Option<String>,
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
    pub retry_delay: Option<Duration>,
    /// Merged after the client's static headers; later entries win.
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::method("GET")
    }

    pub fn delete() -> Self {
        Self::method("DELETE")
    }

    pub fn method(method: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            body: None,
            timeout: None,
            retries: None,
            retry_delay: None,
            headers: Vec::new(),
        }
    }

    /// `POST` with `body` serialized as JSON.
    pub fn post<B: Serialize + ?Sized>(body: &B) -> Result<Self, ApiError> {
        Self::method("POST").json(body)
    }

    /// `PATCH` with `body` serialized as JSON.
    pub fn patch<B: Serialize + ?Sized>(body: &B) -> Result<Self, ApiError> {
        Self::method("PATCH").json(body)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let encoded = serde_json::to_string(body).map_err(|e| {
            ApiError::new(
                ErrorCode::InvalidRequest,
                format!("failed to serialize request body: {e}"),
            )
        })?;
        self.body = Some(encoded);
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn effective_policy(&self, base: &RetryPolicy) -> RetryPolicy {
        RetryPolicy {
            timeout: self.timeout.unwrap_or(base.timeout),
            max_retries: self.retries.unwrap_or(base.max_retries),
            retry_delay: self.retry_delay.unwrap_or(base.retry_delay),
            ..*base
        }
    }
}

/// How one attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RetryableFailure,
    FatalFailure,
}

/// Record of a single attempt, emitted to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestAttempt {
    /// 1-based.
    pub index: u32,
    pub status: Option<u16>,
    /// Wait before the next attempt; zero when none follows.
    pub delay: Duration,
    pub outcome: AttemptOutcome,
}

impl<T: Transport> OrganiselyClient<T> {
    /// Perform a call and decode a successful body into `R`.
    ///
    /// # Errors
    /// Whatever [`execute_raw`](Self::execute_raw) returns, or an
    /// `internal_error` when the success body does not decode as `R`.
    pub async fn execute<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<R>, ApiError> {
        let response = self.execute_raw(endpoint, options).await?;
        let request_id = response.request_id.clone().unwrap_or_default();
        response.try_map(|body| {
            body.decode::<R>().map_err(|e| {
                ApiError::internal(format!("failed to decode response body: {e}"))
                    .with_request_id(request_id.clone())
            })
        })
    }

    /// Perform a call whose success body carries nothing the caller needs.
    ///
    /// Any 2xx body, JSON or otherwise, yields `data: Some(())`.
    pub async fn execute_void(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<()>, ApiError> {
        let response = self.execute_raw(endpoint, options).await?;
        response.try_map(|_| Ok::<(), ApiError>(()))
    }

    /// Perform a call with retries and return the parsed body untouched.
    ///
    /// Attempts run while `attempt <= max_retries`. Network failures and
    /// timeouts end the call at once, as do 400, 401, 403, 404, 405 and 422.
    /// Other failures are retried after `RetryPolicy::delay_for(attempt)`.
    ///
    /// Dropping the returned future cancels the in-flight attempt or the
    /// pending backoff sleep.
    pub async fn execute_raw(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<ResponseBody>, ApiError> {
        let request_id = generate_request_id();

        if !endpoint.starts_with('/') {
            return Err(ApiError::new(
                ErrorCode::InvalidRequest,
                format!("endpoint must be a relative path starting with '/': {endpoint}"),
            )
            .with_request_id(request_id));
        }

        let policy = options.effective_policy(&self.policy);
        let url = format!("{}{}", self.config.base_url, endpoint);
        let request_headers = self.build_headers(&request_id, &options.headers);

        let span = debug_span!(
            "organisely_request",
            request_id = %request_id,
            method = %options.method,
            endpoint = %endpoint,
        );

        async move {
            let mut last_error: Option<ApiError> = None;
            let mut attempt: u32 = 0;

            while attempt <= policy.max_retries {
                debug!(attempt = attempt + 1, url = %url, "Making request");

                let request = TransportRequest {
                    method: options.method.clone(),
                    url: url.clone(),
                    headers: request_headers.clone(),
                    body: options.body.clone(),
                    timeout: policy.timeout,
                };

                let response =
                    match tokio::time::timeout(policy.timeout, self.transport.send(request)).await {
                        Ok(Ok(response)) => response,
                        Ok(Err(e)) => {
                            warn!(attempt = attempt + 1, "Transport failure: {}", e);
                            return Err(network_failure(&e, &request_id));
                        }
                        Err(_) => {
                            let e = TransportError::Timeout(policy.timeout);
                            warn!(attempt = attempt + 1, "Transport failure: {}", e);
                            return Err(network_failure(&e, &request_id));
                        }
                    };

                self.record_rate_limit(&response);

                let status = response.status;
                let succeeded = response.is_success();
                let content_type = response.header("content-type").map(str::to_string);
                let response_headers = response.headers;
                let body = ResponseBody::parse(content_type.as_deref(), response.body);

                if succeeded {
                    let record = RequestAttempt {
                        index: attempt + 1,
                        status: Some(status),
                        delay: Duration::ZERO,
                        outcome: AttemptOutcome::Success,
                    };
                    debug!(?record, "Request successful");
                    return Ok(ApiResponse {
                        success: true,
                        data: Some(body),
                        error: None,
                        message: None,
                        status_code: Some(status),
                        headers: Some(response_headers),
                        request_id: Some(request_id),
                    });
                }

                let err = classify::build_error(status, &body, &request_id);
                if !classify::is_retryable_status(status) {
                    let record = RequestAttempt {
                        index: attempt + 1,
                        status: Some(status),
                        delay: Duration::ZERO,
                        outcome: AttemptOutcome::FatalFailure,
                    };
                    debug!(?record, code = %err.code, "Request failed, not retrying");
                    return Err(err);
                }
                last_error = Some(err);

                attempt += 1;
                if attempt <= policy.max_retries {
                    let delay = policy.delay_for(attempt);
                    let record = RequestAttempt {
                        index: attempt,
                        status: Some(status),
                        delay,
                        outcome: AttemptOutcome::RetryableFailure,
                    };
                    debug!(?record, "Retrying in {}ms", delay.as_millis());
                    tokio::time::sleep(delay).await;
                }
            }

            error!(
                attempts = attempt,
                last_error = ?last_error.as_ref().map(|e| e.message.as_str()),
                "All retries exhausted"
            );

            Err(last_error.unwrap_or_else(|| {
                ApiError::internal("Request failed after all retries").with_request_id(request_id)
            }))
        }
        .instrument(span)
        .await
    }

    /// Fixed headers, then static config headers, then per-call headers,
    /// then bearer auth. A later header replaces an earlier one of the same
    /// name regardless of case.
    fn build_headers(&self, request_id: &str, extra: &[(String, String)]) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = Vec::new();

        set_header(&mut merged, "Content-Type", "application/json");
        set_header(&mut merged, "User-Agent", &self.config.user_agent);
        set_header(&mut merged, headers::REQUEST_ID, request_id);
        set_header(&mut merged, headers::SDK_VERSION, SDK_VERSION);

        for (name, value) in &self.config.headers {
            set_header(&mut merged, name, value);
        }
        for (name, value) in extra {
            set_header(&mut merged, name, value);
        }

        if let Some(api_key) = self.api_key() {
            set_header(&mut merged, "Authorization", &format!("Bearer {api_key}"));
        }

        merged
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.1 = value.to_string(),
        None => headers.push((name.to_string(), value.to_string())),
    }
}

fn network_failure(cause: &TransportError, request_id: &str) -> ApiError {
    ApiError::network(format!("Network error or timeout: {cause}")).with_request_id(request_id)
}

/// `req_<epoch-ms>_<9 base36 chars>`.
pub(crate) fn generate_request_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| REQUEST_ID_ALPHABET[rng.gen_range(0..REQUEST_ID_ALPHABET.len())] as char)
        .collect();
    format!("req_{}_{}", chrono::Utc::now().timestamp_millis(), suffix)
}
