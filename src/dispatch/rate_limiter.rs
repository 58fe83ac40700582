//! Rate limiting and throttling.
//!
//! Simple sliding window rate limiter keyed by caller identity. In-memory,
//! best-effort: resets on process restart. Advisory throttling only, not a
//! security control.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};

use crate::types::{Error, RateLimitConfig, Result};

/// Sliding window for tracking one caller's requests.
#[derive(Debug)]
struct SlidingWindow {
    timestamps: VecDeque<DateTime<Utc>>,
}

impl SlidingWindow {
    fn new() -> Self {
        Self {
            timestamps: VecDeque::new(),
        }
    }

    /// Check whether a request is allowed under the configured quota and
    /// record it if so.
    fn check_and_record(&mut self, now: DateTime<Utc>, config: &RateLimitConfig) -> Result<()> {
        let window_start = now - Duration::from_std(config.window).unwrap_or(Duration::seconds(60));

        // Evict timestamps that slid out of the window
        while let Some(&ts) = self.timestamps.front() {
            if ts < window_start {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() >= config.max_requests as usize {
            return Err(Error::rate_limited(format!(
                "{} requests per {}s window",
                config.max_requests,
                config.window.as_secs()
            )));
        }

        self.timestamps.push_back(now);
        Ok(())
    }
}

/// Rate limiter - enforces a per-caller request quota.
///
/// NOT a separate actor - owned by the dispatcher state and called behind a
/// lock per request.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    caller_windows: HashMap<String, SlidingWindow>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            caller_windows: HashMap::new(),
        }
    }

    /// Check the rate limit for a caller and record the request if allowed.
    pub fn check_rate_limit(&mut self, caller_id: &str) -> Result<()> {
        self.check_rate_limit_at(caller_id, Utc::now())
    }

    fn check_rate_limit_at(&mut self, caller_id: &str, now: DateTime<Utc>) -> Result<()> {
        let window = self
            .caller_windows
            .entry(caller_id.to_string())
            .or_insert_with(SlidingWindow::new);
        window.check_and_record(now, &self.config)
    }

    /// Current request count for a caller within the window.
    pub fn current_rate(&self, caller_id: &str) -> usize {
        match self.caller_windows.get(caller_id) {
            Some(window) => {
                let window_start = Utc::now()
                    - Duration::from_std(self.config.window).unwrap_or(Duration::seconds(60));
                window
                    .timestamps
                    .iter()
                    .filter(|&&ts| ts >= window_start)
                    .count()
            }
            None => 0,
        }
    }

    /// Drop a caller's window.
    pub fn clear_caller(&mut self, caller_id: &str) {
        self.caller_windows.remove(caller_id);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
