//! Rate limit record and status types.
//!
//! Requests are counted per client in fixed one-hour windows aligned to
//! wall-clock hour boundaries.

use serde::{Deserialize, Serialize};

/// Length of a rate limit window in seconds.
pub const WINDOW_SECS: i64 = 3600;

/// Minimum TTL applied to a rate limit record write, in seconds.
pub const MIN_RECORD_TTL_SECS: i64 = 60;

/// Default number of requests a client may make per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 60;

/// Stored request count for one client and one window.
///
/// Persisted as JSON under `rate_limit:<client>:<window_start>`.
/// `reset_time` is the window end in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRecord {
    pub count: u32,
    pub reset_time: i64,
}

impl RateLimitRecord {
    /// A fresh record for the window starting at `window_start` (seconds).
    pub fn empty(window_start: i64) -> Self {
        Self {
            count: 0,
            reset_time: window_start + WINDOW_SECS,
        }
    }
}

/// Quota status reported to callers.
///
/// `reset_time` is in Unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub remaining: u32,
    pub reset_time: i64,
}
