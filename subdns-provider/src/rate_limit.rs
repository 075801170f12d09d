//! Global outbound-call budget.
//!
//! A token bucket shared (via `Arc`) by every provider adapter in the
//! process. One token is taken per outbound API call, inside the retry loop,
//! so each retry attempt is budgeted individually. When the bucket is empty
//! callers suspend until refill; nothing is dropped or failed.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket limiter for outbound provider calls.
///
/// `capacity` bounds the burst size; `refill_per_sec` is the sustained rate.
/// [`acquire`](Self::acquire) never fails, it only waits.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    /// Creates a full bucket.
    ///
    /// Values below 1 are clamped to 1 so the limiter can always make
    /// progress.
    #[must_use]
    pub fn new(capacity: u32, refill_per_sec: u32) -> Self {
        let capacity = f64::from(capacity.max(1));
        Self {
            capacity,
            refill_per_sec: f64::from(refill_per_sec.max(1)),
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Takes one token, waiting for refill when the bucket is empty.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                self.refill(&mut state);
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                // Time until one full token is available.
                let deficit = 1.0 - state.tokens;
                Duration::from_secs_f64(deficit / self.refill_per_sec)
            };
            tokio::time::sleep(wait).await;
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.last_refill = now;
        state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
    }
}
