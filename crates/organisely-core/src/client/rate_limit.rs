//! Rate-limit header tracking.

use serde::{Deserialize, Serialize};

use crate::constants::headers;
use crate::transport::TransportResponse;

/// Most recently observed rate-limit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
    pub limit: u64,
    pub remaining: u64,
    /// Epoch seconds at which the window resets.
    pub reset: u64,
    pub retry_after: Option<u64>,
}

impl RateLimitSnapshot {
    /// Snapshot from response headers. Requires limit, remaining and reset to
    /// all be present and numeric; `Retry-After` is optional.
    pub fn from_response(response: &TransportResponse) -> Option<Self> {
        let number = |name: &str| response.header(name)?.trim().parse::<u64>().ok();

        Some(Self {
            limit: number(headers::RATE_LIMIT_LIMIT)?,
            remaining: number(headers::RATE_LIMIT_REMAINING)?,
            reset: number(headers::RATE_LIMIT_RESET)?,
            retry_after: number(headers::RETRY_AFTER),
        })
    }
}
