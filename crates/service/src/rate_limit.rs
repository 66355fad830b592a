//! Fixed-window request limiting keyed by client (usually the remote IP).
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Result of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window resets.
    pub reset_after: Duration,
}

#[derive(Debug)]
pub struct FixedWindowLimiter {
    name: &'static str,
    max: u32,
    window: Duration,
    enabled: bool,
    windows: DashMap<String, Window>,
}

impl FixedWindowLimiter {
    pub fn new(name: &'static str, max: u32, window: Duration, enabled: bool) -> Self {
        Self { name, max, window, enabled, windows: DashMap::new() }
    }

    pub fn name(&self) -> &'static str { self.name }

    pub fn check(&self, key: &str) -> RateDecision {
        if !self.enabled {
            return RateDecision { allowed: true, limit: self.max, remaining: self.max, reset_after: self.window };
        }
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(Window { started: now, hits: 0 });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.hits = 0;
        }
        let reset_after = self.window.saturating_sub(now.duration_since(entry.started));
        if entry.hits >= self.max {
            warn!(limiter = self.name, %key, hits = entry.hits, "rate limit exceeded");
            return RateDecision { allowed: false, limit: self.max, remaining: 0, reset_after };
        }
        entry.hits += 1;
        debug!(limiter = self.name, %key, hits = entry.hits, "request admitted");
        RateDecision { allowed: true, limit: self.max, remaining: self.max - entry.hits, reset_after }
    }

    /// Drop windows that have fully elapsed.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.windows.retain(|_, w| now.duration_since(w.started) < self.window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_rejects_request_over_max() {
        let limiter = FixedWindowLimiter::new("otp", 3, Duration::from_secs(900), true);
        for expected_remaining in [2, 1, 0] {
            let d = limiter.check("10.0.0.1");
            assert!(d.allowed);
            assert_eq!(d.remaining, expected_remaining);
        }
        let d = limiter.check("10.0.0.1");
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);

        // Other clients have their own window
        assert!(limiter.check("10.0.0.2").allowed);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = FixedWindowLimiter::new("auth", 1, Duration::from_millis(50), true);
        assert!(limiter.check("k").allowed);
        assert!(!limiter.check("k").allowed);

        sleep(Duration::from_millis(70)).await;

        assert!(limiter.check("k").allowed);
    }

    #[tokio::test]
    async fn test_disabled_always_allows() {
        let limiter = FixedWindowLimiter::new("api", 1, Duration::from_secs(60), false);
        for _ in 0..100 {
            assert!(limiter.check("k").allowed);
        }
    }

    #[tokio::test]
    async fn test_sweep_drops_elapsed_windows() {
        let limiter = FixedWindowLimiter::new("api", 5, Duration::from_millis(10), true);
        limiter.check("a");
        sleep(Duration::from_millis(20)).await;
        limiter.sweep();
        assert!(limiter.windows.is_empty());
    }
}
