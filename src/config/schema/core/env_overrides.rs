use super::Config;

impl Config {
    /// Overlay `GATEKEEPER_*` environment variables. Unparseable or empty
    /// values are ignored; bounds are still enforced by `validate`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("GATEKEEPER_FAILURE_THRESHOLD")
            && let Ok(threshold) = raw.parse::<u32>()
        {
            self.circuit_breaker.failure_threshold = threshold;
        }

        if let Ok(raw) = std::env::var("GATEKEEPER_RECOVERY_MINUTES")
            && let Ok(minutes) = raw.parse::<u64>()
        {
            self.circuit_breaker.recovery_period_minutes = minutes;
        }

        if let Ok(raw) = std::env::var("GATEKEEPER_TIMEOUT_SECS")
            && let Ok(secs) = raw.parse::<u64>()
        {
            self.processing.timeout_secs = Some(secs);
        }

        if let Ok(backend) = std::env::var("GATEKEEPER_OBSERVABILITY")
            && !backend.is_empty()
        {
            self.observability.backend = backend;
        }

        if let Ok(level) = std::env::var("GATEKEEPER_LOG_LEVEL")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }
    }
}
