//! Retry policy for the external embedding-model boundary.
//!
//! Stateless: the caller tracks the attempt number (1-based) and asks the
//! policy whether to go again and how long to wait first. Only transient
//! failures of an external model are worth retrying; local computation such
//! as hashing or scoring is never wrapped in a retry.

use std::time::Duration;

use semdex_types::config::EmbeddingConfig;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after that.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_base_delay_ms),
        )
    }

    /// Attempts the policy allows, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether another attempt should follow failed attempt `attempt`.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.attempts()
    }

    /// Delay to wait after failed attempt `attempt` before the next one.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&EmbeddingConfig::default())
    }
}
