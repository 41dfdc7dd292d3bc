//! Rate limiter serializing requests to the ranking site.
//!
//! At most one guarded call runs at a time, and a new one starts only after
//! `min_interval` has elapsed since the previous guard was released. The
//! site falls over when hit with bursts of requests, so every fetch goes
//! through here.

use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{sleep, Instant};

/// Shared gate enforcing a minimum interval between requests
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum time between a release and the next acquisition
    min_interval: Duration,
    /// When the last guard was released
    last_release: Mutex<Option<Instant>>,
}

/// Held for the duration of one request.
///
/// Dropping it, on success, error or cancellation, records the release
/// time and lets the next caller in.
#[derive(Debug)]
pub struct RateLimitGuard<'a> {
    last_release: MutexGuard<'a, Option<Instant>>,
}

impl Drop for RateLimitGuard<'_> {
    fn drop(&mut self) {
        *self.last_release = Some(Instant::now());
    }
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_release: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a request can be made.
    ///
    /// Callers queue on the lock; the holder sleeps out whatever remains of
    /// the interval before the guard is handed back.
    pub async fn acquire(&self) -> RateLimitGuard<'_> {
        let last_release = self.last_release.lock().await;

        if let Some(last) = *last_release {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!(
                    wait_ms = wait_time.as_millis() as u64,
                    "Rate limit: waiting before next request"
                );
                sleep(wait_time).await;
            }
        }

        RateLimitGuard { last_release }
    }
}
