//! Maps failed HTTP responses to [`ApiError`]s and decides retryability.

use crate::error::{ApiError, ErrorCode};

use super::body::ResponseBody;

/// Statuses for which another attempt cannot help.
pub const NON_RETRYABLE_STATUSES: [u16; 6] = [400, 401, 403, 404, 405, 422];

/// Every non-success status outside [`NON_RETRYABLE_STATUSES`] is retried.
pub fn is_retryable_status(status: u16) -> bool {
    !NON_RETRYABLE_STATUSES.contains(&status)
}

/// Error code for a failed response. An explicit `code` in the body wins.
pub fn classify(status: u16, body: &ResponseBody) -> ErrorCode {
    if let Some(code) = body
        .as_object()
        .and_then(|obj| obj.get("code"))
        .and_then(|v| v.as_str())
    {
        return ErrorCode::from(code);
    }

    match status {
        401 => ErrorCode::InvalidApiKey,
        403 => ErrorCode::InsufficientScopes,
        404 => ErrorCode::ResourceNotFound,
        429 => ErrorCode::RateLimited,
        422 => ErrorCode::ValidationError,
        500 => ErrorCode::InternalError,
        503 => ErrorCode::ServiceUnavailable,
        _ => ErrorCode::InternalError,
    }
}

/// Body `error`, then body `message`, then `HTTP <status>`.
pub fn error_message(status: u16, body: &ResponseBody) -> String {
    let obj = body.as_object();
    ["error", "message"]
        .iter()
        .find_map(|field| obj.and_then(|o| o.get(*field)).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

pub fn build_error(status: u16, body: &ResponseBody, request_id: &str) -> ApiError {
    let mut error = ApiError::new(classify(status, body), error_message(status, body))
        .with_status(status)
        .with_request_id(request_id);
    error.details = body.to_details();
    error
}
