//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Limiter {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    RateLimiter::direct(quota)
}

/// Max intent messages per second from one client
pub const INPUT_RATE_LIMIT: u32 = 60;

/// Per-connection limiter for intent messages
pub struct InputRateLimiter {
    limiter: Limiter,
}

impl InputRateLimiter {
    pub fn new() -> Self {
        Self::with_rate(INPUT_RATE_LIMIT)
    }

    pub fn with_rate(per_second: u32) -> Self {
        Self {
            limiter: create_limiter(per_second),
        }
    }

    /// Check if an input message is allowed (returns true if allowed)
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for InputRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_beyond_quota_is_refused() {
        let limiter = InputRateLimiter::with_rate(5);

        let allowed = (0..20).filter(|_| limiter.check()).count();

        assert_eq!(allowed, 5);
    }

    #[test]
    fn test_zero_rate_still_allows_one() {
        let limiter = InputRateLimiter::with_rate(0);
        assert!(limiter.check());
    }
}
