use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::interval};
use tracing::{debug, info, warn};

use crate::rate_limiter::RateLimiter;

/// Periodically drops rate-limit ledger entries for clients that have gone
/// idle, so the ledger does not grow without bound over the process lifetime.
pub struct CleanupService {
    rate_limiter: Arc<RateLimiter>,
    cleanup_interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl CleanupService {
    pub fn new(rate_limiter: Arc<RateLimiter>, cleanup_interval: Duration) -> Self {
        Self {
            rate_limiter,
            cleanup_interval,
            handle: None,
        }
    }

    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("Cleanup service is already running");
            return;
        }

        let rate_limiter = Arc::clone(&self.rate_limiter);
        let interval_duration = self.cleanup_interval;

        let handle = tokio::spawn(async move {
            info!(
                "Starting cleanup service with interval: {:?}",
                interval_duration
            );

            let mut cleanup_interval = interval(interval_duration);

            loop {
                cleanup_interval.tick().await;

                let removed = rate_limiter.sweep_idle();
                if removed > 0 {
                    info!("Cleaned up {} idle rate limit entries", removed);
                } else {
                    debug!("No idle rate limit entries to clean up");
                }
            }
        });

        self.handle = Some(handle);
        info!("Cleanup service started successfully");
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Cleanup service stopped");
        } else {
            debug!("Cleanup service is not running");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for CleanupService {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limiter::RateLimitConfig;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_cleanup_service_lifecycle() {
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()));
        let mut cleanup_service = CleanupService::new(rate_limiter, Duration::from_secs(1));

        assert!(!cleanup_service.is_running());

        cleanup_service.start();
        assert!(cleanup_service.is_running());

        // Starting again should warn but not create a duplicate task.
        cleanup_service.start();
        assert!(cleanup_service.is_running());

        cleanup_service.stop();
        sleep(Duration::from_millis(10)).await;
        assert!(!cleanup_service.is_running());

        // Stopping again should be safe.
        cleanup_service.stop();
        assert!(!cleanup_service.is_running());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_active_clients() {
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()));
        assert!(rate_limiter.allow("active_user"));

        let mut cleanup_service =
            CleanupService::new(Arc::clone(&rate_limiter), Duration::from_millis(10));
        cleanup_service.start();
        sleep(Duration::from_millis(50)).await;

        // Entries still inside the window must survive the sweep.
        assert_eq!(rate_limiter.tracked_clients(), 1);
        cleanup_service.stop();
    }
}
