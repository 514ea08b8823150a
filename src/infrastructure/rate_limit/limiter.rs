//! Sliding window rate limiter keyed by client address

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::domain::RateLimitRule;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Outcome of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Requests left in the current window
    pub remaining: u32,
    pub limit: u32,
    /// Seconds until the oldest counted request leaves the window
    pub reset_in_seconds: u64,
}

/// Per-client sliding window limiter
#[derive(Debug)]
pub struct RateLimiter {
    rule: RateLimitRule,
    records: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    last_cleanup: Arc<RwLock<Instant>>,
}

impl RateLimiter {
    pub fn new(rule: RateLimitRule) -> Self {
        Self {
            rule,
            records: Arc::new(RwLock::new(HashMap::new())),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    pub fn rule(&self) -> &RateLimitRule {
        &self.rule
    }

    /// Count the request against `client` when it fits in the window
    pub async fn check_and_record(&self, client: &str) -> RateLimitResult {
        self.maybe_cleanup().await;

        let now = Instant::now();
        let mut records = self.records.write().await;
        let timestamps = records.entry(client.to_string()).or_default();

        let window_start = now.checked_sub(self.rule.window).unwrap_or(now);
        timestamps.retain(|t| *t > window_start);

        let limit = self.rule.requests;
        let window_secs = self.rule.window.as_secs().max(1);
        let count = timestamps.len() as u32;

        if count >= limit {
            let reset_in_seconds = timestamps
                .first()
                .map(|oldest| {
                    let remaining = self.rule.window.saturating_sub(now.duration_since(*oldest));
                    remaining.as_secs_f64().ceil() as u64
                })
                .unwrap_or(window_secs)
                .max(1);

            return RateLimitResult {
                allowed: false,
                remaining: 0,
                limit,
                reset_in_seconds,
            };
        }

        timestamps.push(now);

        RateLimitResult {
            allowed: true,
            remaining: limit.saturating_sub(count + 1),
            limit,
            reset_in_seconds: window_secs,
        }
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.records.read().await.len()
    }

    async fn maybe_cleanup(&self) {
        let due = self.last_cleanup.read().await.elapsed() >= CLEANUP_INTERVAL;

        if due {
            *self.last_cleanup.write().await = Instant::now();
            self.prune().await;
        }
    }

    /// Drop timestamps that left the window and clients with none left
    async fn prune(&self) {
        let now = Instant::now();
        let window_start = now.checked_sub(self.rule.window).unwrap_or(now);

        let mut records = self.records.write().await;
        for timestamps in records.values_mut() {
            timestamps.retain(|t| *t > window_start);
        }
        records.retain(|_, v| !v.is_empty());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitRule::default())
    }
}
