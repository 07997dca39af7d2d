use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::config::RateLimitSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Denied { retry_after_secs: u64 },
}

impl Admission {
    pub fn is_admitted(self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Per-key fixed-window counter. Each key keeps the instants of its admitted
/// requests that are still inside the window, oldest first.
#[derive(Debug)]
pub struct InMemoryRateLimiter {
    window: Duration,
    max_requests: usize,
    sweep_threshold: usize,
    buckets: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl InMemoryRateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        Self {
            window: settings.window,
            max_requests: settings.max_requests,
            sweep_threshold: settings.sweep_threshold,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, key: &str) -> Admission {
        self.admit(key, Instant::now())
    }

    pub fn admit(&self, key: &str, now: Instant) -> Admission {
        let mut buckets = self.buckets.lock();

        // Only sweep once the map has grown past the high-water mark.
        if buckets.len() > self.sweep_threshold {
            let before = buckets.len();
            buckets.retain(|_, bucket| {
                evict_expired(bucket, now, self.window);
                !bucket.is_empty()
            });
            tracing::debug!(
                removed = before - buckets.len(),
                remaining = buckets.len(),
                "rate limiter sweep"
            );
        }

        let bucket = buckets.entry(key.to_string()).or_default();
        evict_expired(bucket, now, self.window);

        if bucket.len() >= self.max_requests {
            let retry_after_secs = bucket
                .front()
                .map(|oldest| retry_after_secs(*oldest, now, self.window))
                .unwrap_or(1);
            return Admission::Denied { retry_after_secs };
        }

        bucket.push_back(now);
        Admission::Admitted
    }

    pub fn tracked_keys(&self) -> usize {
        self.buckets.lock().len()
    }
}

fn evict_expired(bucket: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(front) = bucket.front().copied() {
        if now.saturating_duration_since(front) >= window {
            bucket.pop_front();
        } else {
            break;
        }
    }
}

fn retry_after_secs(oldest: Instant, now: Instant, window: Duration) -> u64 {
    let remaining = window.saturating_sub(now.saturating_duration_since(oldest));
    let millis = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX);
    millis.div_ceil(1000).max(1)
}
