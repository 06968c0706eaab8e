//! The uniform response envelope returned by every public operation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `{success, data?, error?, message?, statusCode?, headers?, requestId?}`.
///
/// Void operations use `ApiResponse<()>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::succeeded()
        }
    }

    /// Successful envelope without data.
    pub fn succeeded() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: None,
            status_code: None,
            headers: None,
            request_id: None,
        }
    }

    /// Failed envelope with an error description.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::succeeded()
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    /// Converts the payload, keeping every other field.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<ApiResponse<U>, E> {
        let data = self.data.map(f).transpose()?;
        Ok(ApiResponse {
            success: self.success,
            data,
            error: self.error,
            message: self.message,
            status_code: self.status_code,
            headers: self.headers,
            request_id: self.request_id,
        })
    }
}
