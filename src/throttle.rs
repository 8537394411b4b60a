//! Delay-between-calls rate limiting.
//!
//! A [`Throttle`] spaces out consecutive calls to one external service. The
//! first call passes straight through; each later call waits the interval,
//! plus optional random jitter. Nothing is slept after the last call.

use std::time::Duration;
use tracing::debug;

/// Spaces consecutive calls to a single upstream by a fixed interval.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    jitter: Duration,
    primed: bool,
}

impl Throttle {
    /// Creates a throttle with a fixed interval between calls.
    pub fn new(interval: Duration) -> Self {
        Self { interval, jitter: Duration::ZERO, primed: false }
    }

    /// Creates a throttle from a delay in seconds. Negative, non-finite or
    /// out-of-range values mean no delay.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::new(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
    }

    /// Adds up to `jitter` of random extra delay to every wait.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the next call may proceed.
    pub async fn wait(&mut self) {
        if !self.primed {
            self.primed = true;
            return;
        }

        let delay = self.interval.saturating_add(self.jitter_sample());
        if delay.is_zero() {
            return;
        }

        debug!("Delaying {}ms", delay.as_millis());
        tokio::time::sleep(delay).await;
    }

    fn jitter_sample(&self) -> Duration {
        let max = self.jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::random_range(0..=max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_first_wait_is_immediate() {
        let mut throttle = Throttle::new(Duration::from_secs(5));
        let start = Instant::now();
        throttle.wait().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_second_wait_sleeps() {
        let mut throttle = Throttle::new(Duration::from_millis(50));
        throttle.wait().await;

        let start = Instant::now();
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_from_secs_f64() {
        assert_eq!(Throttle::from_secs_f64(1.5).interval(), Duration::from_millis(1500));
        assert_eq!(Throttle::from_secs_f64(-1.0).interval(), Duration::ZERO);
        assert_eq!(Throttle::from_secs_f64(f64::NAN).interval(), Duration::ZERO);
        assert_eq!(Throttle::from_secs_f64(1e30).interval(), Duration::ZERO);
    }

    #[test]
    fn test_jitter_bounded() {
        let throttle = Throttle::new(Duration::ZERO).with_jitter(Duration::from_millis(10));
        for _ in 0..20 {
            assert!(throttle.jitter_sample() <= Duration::from_millis(10));
        }
    }
}
