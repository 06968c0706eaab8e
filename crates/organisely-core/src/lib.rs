//! # Organisely Core Library
//!
//! Client SDK for the Organisely productivity-platform API. The CLI binary
//! (`organisely-cli`) is a thin front end over this crate.
//!
//! ## Architecture
//!
//! - **Request engine**: every API call runs through a retry loop with
//!   exponential backoff, error classification and rate-limit tracking,
//!   layered over a pluggable [`Transport`]
//! - **Integration registry**: stores integration descriptors and resolves
//!   extensions against their base integrations (one level deep)
//! - **Bot**: turns incoming webhook payloads into normalized events
//! - **OAuth**: authorization-code helper for third-party apps
//!
//! ## Key Components
//!
//! - [`OrganiselyClient`]: API client and request engine
//! - [`IntegrationRegistry`]: dependency resolver for integrations
//! - [`ClientConfig`]: client configuration, persisted as TOML by the CLI
//! - [`ApiResponse`]: response envelope shared by every operation

pub mod bot;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod integrations;
pub mod models;
pub mod oauth;
pub mod response;
pub mod transport;

pub use bot::{Bot, BotConfig, BotWebhookPayload, WebhookReply};
pub use client::{OrganiselyClient, RateLimitSnapshot, RequestOptions, ResponseBody};
pub use config::{ClientConfig, RetryPolicy};
pub use error::{ApiError, ConfigError, CoreError, ErrorCode, RegistryError};
pub use integrations::{IntegrationRegistry, ValidationReport};
pub use oauth::{OAuthClient, OAuthConfig, OAuthTokenResponse, TokenTypeHint};
pub use response::ApiResponse;
pub use transport::{HttpTransport, Transport, TransportError, TransportRequest, TransportResponse};
