use std::time::Duration;

use rand::Rng;

/// Poll delay that doubles on each consecutive failure up to a cap, with
/// +/- 20% jitter, and snaps back to the base interval on success.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max_delay: Duration,
    failures: u32,
    jitter: f64,
}

impl Backoff {
    pub fn new(base: Duration) -> Self {
        Self::new_with_limits(base, base.saturating_mul(10))
    }

    pub fn new_with_limits(base: Duration, max_delay: Duration) -> Self {
        Self {
            base,
            max_delay: max_delay.max(base),
            failures: 0,
            jitter: 0.2,
        }
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Delay before the next poll, without jitter.
    pub fn current_delay(&self) -> Duration {
        if self.failures == 0 {
            return self.base;
        }
        let factor = 2u32.saturating_pow(self.failures.min(16));
        self.base.saturating_mul(factor).min(self.max_delay)
    }

    /// Delay before the next poll. Jitter only applies while backing off.
    pub fn next_delay(&self) -> Duration {
        let delay = self.current_delay();
        if self.failures == 0 {
            return delay;
        }
        let spread = rand::thread_rng().gen_range(-self.jitter..=self.jitter);
        Duration::try_from_secs_f64(delay.as_secs_f64() * (1.0 + spread))
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}
