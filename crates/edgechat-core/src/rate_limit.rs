//! Per-client hourly request quota.
//!
//! Counts are kept in the key-value store under
//! `rate_limit:<client>:<window_start>` where `window_start` is the current
//! time floored to the hour. Records expire through store TTL; a sweep can
//! delete stale windows early.
//!
//! Two properties follow from the storage model and are accepted:
//! - windows are fixed, so a client can send up to `2 * max_requests`
//!   across an hour boundary;
//! - check and increment are separate store calls, so concurrent requests
//!   from one client can under-count by up to `concurrency - 1`.
//!
//! Reads fail open and writes are best effort. A broken store never blocks
//! a request.

use std::sync::Arc;

use tracing::{debug, warn};

use edgechat_types::error::RepositoryError;
use edgechat_types::rate_limit::{
    MIN_RECORD_TTL_SECS, RateLimitRecord, RateLimitStatus, WINDOW_SECS,
};

use crate::clock::{Clock, hour_window_start};
use crate::storage::kv_store::{KvStore, PutOptions};

/// Key prefix shared by all rate limit records.
pub const KEY_PREFIX: &str = "rate_limit:";

/// Outcome of recording a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaWrite {
    /// The new count was stored.
    Recorded { count: u32 },
    /// The write failed; the request proceeds uncounted.
    BestEffortFailed { reason: String },
}

/// Result of a sweep over stored rate limit records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: usize,
    pub errors: usize,
}

/// Fixed-window request counter over a [`KvStore`].
pub struct RateLimiter<S: KvStore> {
    store: S,
    max_requests: u32,
    clock: Arc<dyn Clock>,
}

impl<S: KvStore> RateLimiter<S> {
    pub fn new(store: S, max_requests: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            max_requests,
            clock,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Report the remaining quota for `client_id` in the current window.
    ///
    /// Never mutates. Fails open: an unreadable or undecodable record
    /// reports the full quota.
    pub async fn check_limit(&self, client_id: &str) -> RateLimitStatus {
        let window_start = hour_window_start(self.clock.now());
        let key = record_key(client_id, window_start);
        let full = RateLimitStatus {
            remaining: self.max_requests,
            reset_time: (window_start + WINDOW_SECS) * 1000,
        };

        match self.load(&key, window_start).await {
            Ok(record) => RateLimitStatus {
                remaining: self.max_requests.saturating_sub(record.count),
                reset_time: record.reset_time.saturating_mul(1000),
            },
            Err(e) => {
                warn!(client_id, error = %e, "rate limit check failed, allowing request");
                full
            }
        }
    }

    /// Count one request against `client_id` in the current window.
    ///
    /// The record TTL is the time left in the window, at least 60 seconds.
    /// Failures are returned as [`QuotaWrite::BestEffortFailed`], never
    /// raised.
    pub async fn record_request(&self, client_id: &str) -> QuotaWrite {
        let now = self.clock.now();
        let window_start = hour_window_start(now);
        let key = record_key(client_id, window_start);

        let mut record = match self.load(&key, window_start).await {
            Ok(record) => record,
            Err(e) => return QuotaWrite::BestEffortFailed { reason: e.to_string() },
        };
        record.count = record.count.saturating_add(1);

        let ttl = (record.reset_time - now.timestamp()).max(MIN_RECORD_TTL_SECS) as u64;
        let value = match serde_json::to_string(&record) {
            Ok(value) => value,
            Err(e) => return QuotaWrite::BestEffortFailed { reason: e.to_string() },
        };

        match self.store.put(&key, &value, PutOptions::with_ttl_secs(ttl)).await {
            Ok(()) => {
                debug!(client_id, count = record.count, "request recorded");
                QuotaWrite::Recorded { count: record.count }
            }
            Err(e) => QuotaWrite::BestEffortFailed { reason: e.to_string() },
        }
    }

    /// Delete records whose window has ended, plus records that cannot be
    /// decoded.
    ///
    /// With `client_id` only that client's records are scanned. Errors are
    /// logged and counted.
    pub async fn sweep_expired(&self, client_id: Option<&str>) -> SweepReport {
        let prefix = match client_id {
            Some(client) => format!("{KEY_PREFIX}{client}:"),
            None => KEY_PREFIX.to_string(),
        };
        let now = self.clock.now().timestamp();
        let mut report = SweepReport::default();

        let keys = match self.store.list(&prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(prefix = %prefix, error = %e, "rate limit sweep could not list records");
                report.errors += 1;
                return report;
            }
        };

        for key in keys {
            report.scanned += 1;
            let stale = match self.store.get(&key).await {
                Ok(Some(raw)) => match serde_json::from_str::<RateLimitRecord>(&raw) {
                    Ok(record) => record.reset_time <= now,
                    Err(_) => true,
                },
                // Expired between list and get.
                Ok(None) => false,
                Err(e) => {
                    warn!(key = %key, error = %e, "rate limit sweep could not read record");
                    report.errors += 1;
                    continue;
                }
            };

            if stale {
                match self.store.delete(&key).await {
                    Ok(()) => report.deleted += 1,
                    Err(e) => {
                        warn!(key = %key, error = %e, "rate limit sweep could not delete record");
                        report.errors += 1;
                    }
                }
            }
        }

        debug!(?report, "rate limit sweep finished");
        report
    }

    async fn load(&self, key: &str, window_start: i64) -> Result<RateLimitRecord, RepositoryError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(RateLimitRecord::empty(window_start));
        };

        let record: RateLimitRecord =
            serde_json::from_str(&raw).map_err(|e| RepositoryError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        // A record always resets at the end of the window it is keyed by.
        let expected = window_start + WINDOW_SECS;
        if record.reset_time != expected {
            return Err(RepositoryError::Corrupt {
                key: key.to_string(),
                reason: format!("resetTime {} does not match window end {expected}", record.reset_time),
            });
        }
        Ok(record)
    }
}

/// Store key for a client's record in the window starting at `window_start`.
pub fn record_key(client_id: &str, window_start: i64) -> String {
    format!("{KEY_PREFIX}{client_id}:{window_start}")
}
