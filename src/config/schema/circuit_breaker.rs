use crate::core::gatekeeper::BreakerPolicy;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shortest allowed recovery window (1.5 hours).
pub const MIN_RECOVERY_MINUTES: u64 = 90;
/// Longest allowed recovery window (8 hours).
pub const MAX_RECOVERY_MINUTES: u64 = 480;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_recovery_period_minutes")]
    pub recovery_period_minutes: u64,
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_recovery_period_minutes() -> u64 {
    120
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            recovery_period_minutes: default_recovery_period_minutes(),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn policy(&self) -> BreakerPolicy {
        BreakerPolicy {
            failure_threshold: self.failure_threshold,
            recovery_period: Duration::from_secs(self.recovery_period_minutes * 60),
        }
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::Validation(
                "circuit_breaker.failure_threshold must be at least 1".into(),
            ));
        }
        if !(MIN_RECOVERY_MINUTES..=MAX_RECOVERY_MINUTES).contains(&self.recovery_period_minutes)
        {
            return Err(ConfigError::Validation(format!(
                "circuit_breaker.recovery_period_minutes must be in [{MIN_RECOVERY_MINUTES}, {MAX_RECOVERY_MINUTES}], got {}",
                self.recovery_period_minutes
            )));
        }
        Ok(())
    }
}
