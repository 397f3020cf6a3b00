use std::time::Duration;

use super::BackoffPolicy;
use crate::domain::errors::{DomainError, Result};

pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(16);
pub const DEFAULT_IDLE_SLEEP: Duration = Duration::from_millis(100);

/// Timing of the receive loop: poll bound, idle sleep and reconnect backoff
#[derive(Debug, Clone, PartialEq)]
pub struct LoopTiming {
    poll_timeout: Duration,
    idle_sleep: Duration,
    backoff: BackoffPolicy,
}

impl LoopTiming {
    pub fn new(poll_timeout: Duration, idle_sleep: Duration, backoff: BackoffPolicy) -> Result<Self> {
        if poll_timeout.is_zero() {
            return Err(DomainError::InvalidTiming(
                "poll timeout must be positive".to_string(),
            ));
        }
        if idle_sleep.is_zero() {
            return Err(DomainError::InvalidTiming(
                "idle sleep must be positive".to_string(),
            ));
        }

        Ok(Self {
            poll_timeout,
            idle_sleep,
            backoff,
        })
    }

    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    pub fn idle_sleep(&self) -> Duration {
        self.idle_sleep
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Upper bound between enqueueing Shutdown and the loop observing it
    pub fn shutdown_bound(&self) -> Duration {
        self.poll_timeout + self.idle_sleep
    }
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            idle_sleep: DEFAULT_IDLE_SLEEP,
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Configuration of one receive bridge instance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReceiveConfig {
    name: String,
    timing: LoopTiming,
}

impl ReceiveConfig {
    pub fn new(name: impl Into<String>, timing: LoopTiming) -> Self {
        Self {
            name: name.into(),
            timing,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timing(&self) -> &LoopTiming {
        &self.timing
    }
}
