use std::time::Duration;

use crate::domain::errors::{DomainError, Result};

/// Delay applied before re-allocating a receiver after a poll failure.
///
/// A multiplier of exactly 1.0 gives a fixed delay, which is the default.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl BackoffPolicy {
    pub fn new(initial_delay: Duration, max_delay: Duration, multiplier: f64) -> Result<Self> {
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(DomainError::InvalidBackoffMultiplier);
        }

        if max_delay < initial_delay {
            return Err(DomainError::InvalidBackoffDelays {
                initial_ms: initial_delay.as_millis(),
                max_ms: max_delay.as_millis(),
            });
        }

        Ok(Self {
            initial_delay,
            max_delay,
            multiplier,
        })
    }

    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1.0,
        }
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn is_fixed(&self) -> bool {
        self.multiplier == 1.0 || self.initial_delay == self.max_delay
    }

    /// Calculate the next backoff delay based on current delay, saturating at `max_delay`
    pub fn next_delay(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_millis(1000))
    }
}
