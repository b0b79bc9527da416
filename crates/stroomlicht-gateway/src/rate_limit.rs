// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Stroomlicht.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Fixed-window rate limiter for the device gateway.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Default request budget per window
pub const RATE_LIMIT: u32 = 100;

/// Default window length in seconds
pub const RATE_WINDOW_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct Window {
    count: u32,
    started_at: DateTime<Utc>,
}

/// Per-client fixed-window counter. The window resets a full window
/// length after its first request, not on a rolling basis. Entries are
/// never cleaned up; the key map grows for the process lifetime, which
/// is fine for a single-process mock.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: HashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: HashMap::new(),
        }
    }

    /// Count one request against the key's current window.
    /// Returns false when the budget is spent; rejected requests do not
    /// consume budget.
    pub fn check(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        match self.windows.get_mut(key) {
            Some(window) if now - window.started_at <= self.window => {
                if window.count >= self.limit {
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                // First request for this key, or the old window expired
                self.windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        started_at: now,
                    },
                );
                true
            }
        }
    }

    /// Number of distinct client keys seen so far
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT, Duration::seconds(RATE_WINDOW_SECS))
    }
}
