//! Circuit breaker
//!
//! Time-windowed switch that disables attempts against a rate-limited
//! provider. One instance per provider; the cooldown timestamp is the only
//! cross-request mutable state in the process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fixed cooldown applied after a rate-limit signal.
///
/// A flat 60 s window is the chosen design: no exponential backoff, no
/// jitter. The fallback provider absorbs traffic while the window is open.
pub const RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);

/// Monotonic clock abstraction, injectable for deterministic tests
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since an arbitrary fixed origin
    fn now_millis(&self) -> u64;
}

/// Wall clock backed by `Instant`
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Cooldown-based circuit breaker for one provider
pub struct CircuitBreaker {
    clock: Arc<dyn Clock>,
    cooldown_ms: u64,
    cooldown_until_ms: AtomicU64,
}

impl CircuitBreaker {
    /// Breaker with the fixed rate-limit cooldown
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_cooldown(clock, RATE_LIMIT_COOLDOWN)
    }

    /// Breaker with a custom cooldown window
    pub fn with_cooldown(clock: Arc<dyn Clock>, cooldown: Duration) -> Self {
        Self {
            clock,
            cooldown_ms: cooldown.as_millis() as u64,
            cooldown_until_ms: AtomicU64::new(0),
        }
    }

    /// True while the cooldown window is open; callers route straight to
    /// the next provider without attempting this one
    pub fn should_skip(&self) -> bool {
        self.clock.now_millis() < self.cooldown_until_ms.load(Ordering::Relaxed)
    }

    /// Open the cooldown window after a rate-limit signal.
    ///
    /// `fetch_max` keeps the deadline monotonic under concurrent calls; a
    /// race costs at most one extra attempt against the provider.
    pub fn record_rate_limit(&self) {
        let until = self.clock.now_millis() + self.cooldown_ms;
        self.cooldown_until_ms.fetch_max(until, Ordering::Relaxed);
    }
}

#[cfg(test)]
pub mod test_support {
    use super::Clock;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Manually advanced clock for breaker tests
    pub struct FakeClock {
        now_ms: AtomicU64,
    }

    impl FakeClock {
        pub fn new() -> Self {
            Self {
                now_ms: AtomicU64::new(0),
            }
        }

        pub fn advance_millis(&self, ms: u64) {
            self.now_ms.fetch_add(ms, Ordering::Relaxed);
        }
    }

    impl Clock for FakeClock {
        fn now_millis(&self) -> u64 {
            self.now_ms.load(Ordering::Relaxed)
        }
    }
}
