//! Per-client admission control using a fixed-window request counter.
//!
//! Each client key owns one [`RateBucket`]. The counter resets whenever the
//! window has fully elapsed since `window_start`; within a window it only
//! grows. This is a fixed-window algorithm, not a sliding window or token
//! bucket: up to `2 * capacity` requests can be admitted in a short span
//! straddling a window boundary. That boundary behavior is intentional and
//! pinned by tests.
//!
//! Buckets are created lazily and never evicted: the map grows with the
//! number of distinct client keys for the process lifetime.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Request counter state for one client key.
#[derive(Debug, Clone, Copy)]
pub struct RateBucket {
    /// Requests counted in the current window.
    pub count: u32,
    /// When the current window opened.
    pub window_start: Instant,
}

/// Fixed-window rate limiter keyed by client identity.
///
/// Safe for concurrent use: increment-or-create runs under a single mutex,
/// so no updates are lost across in-flight requests.
#[derive(Debug)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, RateBucket>>,
    window: Duration,
    capacity: u32,
}

impl RateLimiter {
    /// Create a limiter admitting `capacity` requests per `window` per key.
    pub fn new(window: Duration, capacity: u32) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            window,
            capacity,
        }
    }

    /// Check whether a request from `key` is admitted right now.
    ///
    /// Always counts the request, even when denying it.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    /// [`allow`](Self::allow) with an explicit clock, so tests can drive
    /// window expiry deterministically.
    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut buckets = match self.buckets.lock() {
            Ok(guard) => guard,
            // A panic while holding the lock poisons it; the bucket map is
            // still structurally valid, so keep serving.
            Err(poisoned) => poisoned.into_inner(),
        };

        let bucket = buckets.entry(key.to_owned()).or_insert(RateBucket {
            count: 0,
            window_start: now,
        });

        if now.saturating_duration_since(bucket.window_start) > self.window {
            bucket.count = 0;
            bucket.window_start = now;
        }

        bucket.count = bucket.count.saturating_add(1);
        bucket.count <= self.capacity
    }

    /// Number of distinct client keys seen so far.
    pub fn tracked_keys(&self) -> usize {
        match self.buckets.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

/// Derive the client key for rate limiting.
///
/// Order: first entry of the forwarded-address chain, trimmed; else the raw
/// peer address; else the literal `"unknown"`. All unidentified clients
/// share the sentinel bucket.
pub fn client_key(forwarded_for: Option<&str>, peer_addr: Option<&str>) -> String {
    if let Some(chain) = forwarded_for {
        if let Some(first) = chain.split(',').next() {
            let trimmed = first.trim();
            if !trimmed.is_empty() {
                return trimmed.to_owned();
            }
        }
    }
    match peer_addr {
        Some(addr) if !addr.is_empty() => addr.to_owned(),
        _ => "unknown".to_owned(),
    }
}
