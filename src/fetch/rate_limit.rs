// src/fetch/rate_limit.rs

use once_cell::sync::Lazy;
use std::{
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};
use tracing::trace;

/// Courtesy limit for the statistics API.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 3;

static SHARED: Lazy<RateLimiter> =
    Lazy::new(|| RateLimiter::per_second(DEFAULT_REQUESTS_PER_SECOND));

/// Spaces out request *starts* by at least `min_interval`.
///
/// Cloning yields a handle onto the same timestamp, so every client holding
/// a clone is throttled together. Round-trip latency is not accounted for.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// `requests` per second; zero disables throttling.
    pub fn per_second(requests: u32) -> Self {
        if requests == 0 {
            return Self::new(Duration::ZERO);
        }
        Self::new(Duration::from_secs(1) / requests)
    }

    /// Process-wide limiter at the default rate.
    pub fn shared() -> Self {
        SHARED.clone()
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until a request may start, then stamp the start time.
    ///
    /// The lock is held across the sleep so concurrent callers queue up
    /// behind each other instead of all waking at once.
    pub fn wait(&self) {
        let mut last = match self.last_request.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let delay = self.min_interval - elapsed;
                trace!(delay_ms = delay.as_millis() as u64, "throttling request");
                thread::sleep(delay);
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::shared()
    }
}
