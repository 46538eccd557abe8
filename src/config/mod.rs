pub mod schema;

pub use schema::{
    AuditConfig, CircuitBreakerConfig, Config, MAX_RECOVERY_MINUTES, MIN_RECOVERY_MINUTES,
    ObservabilityConfig, ProcessingConfig,
};
