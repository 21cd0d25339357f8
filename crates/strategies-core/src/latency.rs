use crate::error::{Result, RouterError};
use rand::Rng;
use std::time::Duration;

/// Interval the simulated network delay is drawn from, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyRange {
    min: Duration,
    max: Duration,
}

impl LatencyRange {
    pub const DEFAULT_MIN_MS: u64 = 300;
    pub const DEFAULT_MAX_MS: u64 = 1000;

    pub fn new(min_ms: u64, max_ms: u64) -> Result<Self> {
        if min_ms > max_ms {
            return Err(RouterError::Config(format!(
                "latency minimum {}ms exceeds maximum {}ms",
                min_ms, max_ms
            )));
        }
        Ok(Self {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms),
        })
    }

    /// No delay at all. Useful for tests that do not care about timing.
    pub fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn contains(&self, delay: Duration) -> bool {
        delay >= self.min && delay <= self.max
    }

    /// Draws a delay uniformly from the interval with millisecond resolution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        if min_ms == max_ms {
            return self.min;
        }
        Duration::from_millis(rng.gen_range(min_ms..=max_ms))
    }
}

impl Default for LatencyRange {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(Self::DEFAULT_MIN_MS),
            max: Duration::from_millis(Self::DEFAULT_MAX_MS),
        }
    }
}

/// Suspends the current task for `delay`.
///
/// Dropping the returned future drops the underlying timer, so an aborted call
/// leaves nothing scheduled behind it.
pub async fn simulate(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_samples_stay_in_range() {
        let range = LatencyRange::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(range.contains(range.sample(&mut rng)));
        }
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        assert!(matches!(
            LatencyRange::new(500, 100),
            Err(RouterError::Config(_))
        ));
        assert_eq!(LatencyRange::new(0, 0).unwrap(), LatencyRange::none());
    }
}
