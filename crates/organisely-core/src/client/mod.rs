//! Organisely API client.
//!
//! [`OrganiselyClient`] owns the transport, the static configuration and two
//! small mutable cells (credentials and the latest rate-limit snapshot).
//! Every call goes through the request engine in [`request`], which applies
//! retries with exponential backoff over the [`Transport`].

mod body;
pub mod classify;
mod endpoints;
mod rate_limit;
mod request;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::config::{ClientConfig, RetryPolicy};
use crate::error::ApiError;
use crate::transport::{HttpTransport, Transport, TransportResponse};

pub use body::ResponseBody;
pub use rate_limit::RateLimitSnapshot;
pub use request::{AttemptOutcome, RequestAttempt, RequestOptions};

#[derive(Debug, Clone, Default)]
struct Credentials {
    api_key: Option<String>,
    user_id: Option<String>,
}

/// Client for the Organisely API, generic over its [`Transport`].
///
/// `Send + Sync`; concurrent calls through one client are fine. Each call
/// snapshots the credentials and retry policy when it starts.
#[derive(Debug)]
pub struct OrganiselyClient<T = HttpTransport> {
    transport: T,
    config: ClientConfig,
    policy: RetryPolicy,
    credentials: RwLock<Credentials>,
    rate_limit: RwLock<Option<RateLimitSnapshot>>,
}

impl OrganiselyClient<HttpTransport> {
    /// Client over a pooled HTTPS transport.
    ///
    /// # Errors
    /// Returns a `network_error` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new().map_err(|e| ApiError::network(e.to_string()))?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> OrganiselyClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let policy = RetryPolicy::from_config(&config);
        debug!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            retries = config.retries,
            "OrganiselyClient initialized"
        );

        let credentials = Credentials {
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            user_id: config.user_id.clone().filter(|u| !u.is_empty()),
        };

        Self {
            transport,
            config,
            policy,
            credentials: RwLock::new(credentials),
            rate_limit: RwLock::new(None),
        }
    }

    /// Replace the default retry policy (e.g. to change the backoff multiplier).
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Set the bearer token used by calls started after this returns.
    pub fn set_api_key(&self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        write(&self.credentials).api_key = Some(api_key).filter(|k| !k.is_empty());
        debug!("API key updated");
    }

    pub fn set_user_id(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        debug!(user_id = %user_id, "User ID updated");
        write(&self.credentials).user_id = Some(user_id).filter(|u| !u.is_empty());
    }

    pub fn user_id(&self) -> Option<String> {
        read(&self.credentials).user_id.clone()
    }

    /// Latest rate-limit state reported by the server, if any.
    pub fn rate_limit_info(&self) -> Option<RateLimitSnapshot> {
        *read(&self.rate_limit)
    }

    pub(crate) fn api_key(&self) -> Option<String> {
        read(&self.credentials).api_key.clone()
    }

    /// Explicit id, else the configured one.
    pub(crate) fn resolve_user_id(&self, explicit: Option<&str>) -> Result<String, ApiError> {
        explicit
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| self.user_id())
            .ok_or_else(ApiError::missing_user_id)
    }

    /// Overwrite the snapshot when the response carries a complete header set.
    pub(crate) fn record_rate_limit(&self, response: &TransportResponse) {
        if let Some(snapshot) = RateLimitSnapshot::from_response(response) {
            debug!(
                limit = snapshot.limit,
                remaining = snapshot.remaining,
                reset = snapshot.reset,
                "Rate limit updated"
            );
            *write(&self.rate_limit) = Some(snapshot);
        }
    }
}

fn read<V>(lock: &RwLock<V>) -> RwLockReadGuard<'_, V> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<V>(lock: &RwLock<V>) -> RwLockWriteGuard<'_, V> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
