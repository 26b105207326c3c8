//! Request pacing: a minimum interval between outgoing storefront requests.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Enforces the storefront's throttling expectations as a rate limit
/// rather than a bare sleep, so the pacing survives a later move to
/// concurrent fetching unchanged.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Arc<DirectRateLimiter>,
    interval: Duration,
}

impl RequestPacer {
    /// One request per `interval`, with no burst allowance.
    pub fn new(interval: Duration) -> Self {
        let period = interval.max(Duration::from_millis(1));
        let quota = Quota::with_period(period)
            .expect("pacing interval is always greater than zero")
            .allow_burst(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            interval: period,
        }
    }

    /// Tries to acquire request budget; when none is available, returns the
    /// recommended wait before trying again.
    pub fn acquire(&self) -> Result<(), Duration> {
        match self.limiter.check() {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                // wait_time_from can round down to zero right at the
                // boundary; keep the caller from spinning.
                Err(wait.max(Duration::from_millis(1)))
            }
        }
    }

    /// Suspends until request budget is available.
    pub async fn pace(&self) {
        while let Err(wait) = self.acquire() {
            tokio::time::sleep(wait.min(self.interval)).await;
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }
}
