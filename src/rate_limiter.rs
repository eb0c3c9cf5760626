use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window: Duration,
    pub sweep_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(300),
        }
    }
}

/// Sliding-log rate limiter keyed by client identifier.
///
/// The ledger lives in process memory: it resets on restart and is not shared
/// across instances when horizontally scaled. The mutex guards the full
/// prune-count-record sequence, so the configured bound holds under
/// concurrent requests on one instance.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    ledger: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            ledger: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether `client_id` may make another request, recording the
    /// attempt when allowed. Rejected attempts are not recorded.
    pub fn allow(&self, client_id: &str) -> bool {
        self.allow_at(client_id, Instant::now())
    }

    pub(crate) fn allow_at(&self, client_id: &str, now: Instant) -> bool {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        let timestamps = ledger.entry(client_id.to_string()).or_default();

        if let Some(window_start) = now.checked_sub(self.config.window) {
            timestamps.retain(|t| *t > window_start);
        }

        if timestamps.len() >= self.config.max_requests {
            debug!(
                "Rate limit reached for '{}': {}/{} requests in current window",
                client_id,
                timestamps.len(),
                self.config.max_requests
            );
            return false;
        }

        timestamps.push(now);
        debug!(
            "Rate limit check for '{}': {}/{} requests in current window",
            client_id,
            timestamps.len(),
            self.config.max_requests
        );
        true
    }

    /// Number of requests recorded for `client_id` within the current window.
    pub fn current_usage(&self, client_id: &str) -> usize {
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        ledger
            .get(client_id)
            .map(|timestamps| match now.checked_sub(self.config.window) {
                Some(window_start) => timestamps.iter().filter(|t| **t > window_start).count(),
                None => timestamps.len(),
            })
            .unwrap_or(0)
    }

    /// Drop ledger entries whose every timestamp has left the window.
    /// Returns the number of removed client keys.
    pub fn sweep_idle(&self) -> usize {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        let window_start = match Instant::now().checked_sub(self.config.window) {
            Some(window_start) => window_start,
            None => return 0,
        };

        let before = ledger.len();
        ledger.retain(|_, timestamps| timestamps.iter().any(|t| *t > window_start));
        before - ledger.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn max_requests(&self) -> usize {
        self.config.max_requests
    }

    pub fn window_seconds(&self) -> u64 {
        self.config.window.as_secs()
    }

    pub fn sweep_interval(&self) -> Duration {
        self.config.sweep_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: usize) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            ..RateLimitConfig::default()
        })
    }

    #[test]
    fn test_allows_requests_within_limit() {
        let limiter = limiter(10);
        for i in 1..=10 {
            assert!(limiter.allow("test_user"), "request {} should be allowed", i);
        }
    }

    #[test]
    fn test_blocks_request_over_limit() {
        let limiter = limiter(10);
        let base = Instant::now();
        for _ in 0..10 {
            assert!(limiter.allow_at("test_user", base));
        }
        assert!(!limiter.allow_at("test_user", base + Duration::from_secs(1)));
    }

    #[test]
    fn test_allows_after_window_elapses() {
        let limiter = limiter(10);
        let base = Instant::now();
        for _ in 0..10 {
            assert!(limiter.allow_at("test_user", base));
        }
        assert!(!limiter.allow_at("test_user", base + Duration::from_secs(30)));
        assert!(limiter.allow_at("test_user", base + Duration::from_secs(61)));
    }

    #[test]
    fn test_rejected_attempt_is_not_recorded() {
        let limiter = limiter(1);
        let base = Instant::now();
        assert!(limiter.allow_at("test_user", base));
        assert!(!limiter.allow_at("test_user", base + Duration::from_secs(1)));
        // The rejection above must not extend the window.
        assert!(limiter.allow_at("test_user", base + Duration::from_secs(61)));
    }

    #[test]
    fn test_distinct_clients_are_independent() {
        let limiter = limiter(1);
        assert!(limiter.allow("first"));
        assert!(!limiter.allow("first"));
        assert!(limiter.allow("second"));
    }

    #[test]
    fn test_current_usage_counts_window_entries() {
        let limiter = limiter(10);
        assert_eq!(limiter.current_usage("test_user"), 0);
        for _ in 0..3 {
            limiter.allow("test_user");
        }
        assert_eq!(limiter.current_usage("test_user"), 3);
    }

    #[test]
    fn test_sweep_idle_removes_expired_clients() {
        let limiter = limiter(10);
        // Monotonic clocks start near boot; skip when there is not enough
        // history to fabricate an expired timestamp.
        let Some(expired) = Instant::now().checked_sub(Duration::from_secs(3600)) else {
            return;
        };
        assert!(limiter.allow_at("expired_user", expired));
        assert!(limiter.allow("active_user"));
        assert_eq!(limiter.tracked_clients(), 2);

        let removed = limiter.sweep_idle();
        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked_clients(), 1);
        assert_eq!(limiter.current_usage("active_user"), 1);
    }
}
