//! Core error types for organisely-core.
//!
//! API failures carry a fixed [`ErrorCode`] plus a payload struct instead of
//! a family of error types; everything else uses thiserror enums.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Core error type for organisely-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Failure reported by the Organisely API or the request engine
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Integration registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stable error codes returned by the API or produced by the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidApiKey,
    InvalidToken,
    TokenExpired,
    InsufficientScopes,
    RateLimited,
    QuotaExceeded,
    ValidationError,
    InvalidRequest,
    MissingRequiredField,
    ResourceNotFound,
    ResourceAlreadyExists,
    ResourceConflict,
    IntegrationNotFound,
    IntegrationDisabled,
    WebhookFailed,
    InternalError,
    ServiceUnavailable,
    Timeout,
    NetworkError,
    /// Server-supplied code outside the known set, kept verbatim.
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::InvalidApiKey => "invalid_api_key",
            ErrorCode::InvalidToken => "invalid_token",
            ErrorCode::TokenExpired => "token_expired",
            ErrorCode::InsufficientScopes => "insufficient_scopes",
            ErrorCode::RateLimited => "rate_limited",
            ErrorCode::QuotaExceeded => "quota_exceeded",
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::MissingRequiredField => "missing_required_field",
            ErrorCode::ResourceNotFound => "resource_not_found",
            ErrorCode::ResourceAlreadyExists => "resource_already_exists",
            ErrorCode::ResourceConflict => "resource_conflict",
            ErrorCode::IntegrationNotFound => "integration_not_found",
            ErrorCode::IntegrationDisabled => "integration_disabled",
            ErrorCode::WebhookFailed => "webhook_failed",
            ErrorCode::InternalError => "internal_error",
            ErrorCode::ServiceUnavailable => "service_unavailable",
            ErrorCode::Timeout => "timeout",
            ErrorCode::NetworkError => "network_error",
            ErrorCode::Other(code) => code,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "invalid_api_key" => ErrorCode::InvalidApiKey,
            "invalid_token" => ErrorCode::InvalidToken,
            "token_expired" => ErrorCode::TokenExpired,
            "insufficient_scopes" => ErrorCode::InsufficientScopes,
            "rate_limited" => ErrorCode::RateLimited,
            "quota_exceeded" => ErrorCode::QuotaExceeded,
            "validation_error" => ErrorCode::ValidationError,
            "invalid_request" => ErrorCode::InvalidRequest,
            "missing_required_field" => ErrorCode::MissingRequiredField,
            "resource_not_found" => ErrorCode::ResourceNotFound,
            "resource_already_exists" => ErrorCode::ResourceAlreadyExists,
            "resource_conflict" => ErrorCode::ResourceConflict,
            "integration_not_found" => ErrorCode::IntegrationNotFound,
            "integration_disabled" => ErrorCode::IntegrationDisabled,
            "webhook_failed" => ErrorCode::WebhookFailed,
            "internal_error" => ErrorCode::InternalError,
            "service_unavailable" => ErrorCode::ServiceUnavailable,
            "timeout" => ErrorCode::Timeout,
            "network_error" => ErrorCode::NetworkError,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(ErrorCode::from(code.as_str()))
    }
}

/// Terminal failure of an API call.
///
/// Built once by the request engine (or by an endpoint method rejecting its
/// input) and handed to the caller unchanged.
#[derive(Error, Debug, Clone, Serialize)]
#[error("{message} ({code})")]
pub struct ApiError {
    pub message: String,
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Parsed response body, when the server sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            status_code: None,
            request_id: None,
            details: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn missing_user_id() -> Self {
        Self::new(ErrorCode::MissingRequiredField, "User ID is required")
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// Integration registry errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The base integration an extension should build on is not registered
    #[error("Base integration {0} not found")]
    BaseNotFound(String),

    /// No integration is registered under this id
    #[error("Integration {0} not found")]
    IntegrationNotFound(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Config directory could not be determined or created
    #[error("Failed to access config directory: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
