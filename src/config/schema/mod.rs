mod audit;
mod circuit_breaker;
mod core;
mod observability;
mod processing;

pub use audit::AuditConfig;
pub use circuit_breaker::{CircuitBreakerConfig, MAX_RECOVERY_MINUTES, MIN_RECOVERY_MINUTES};
pub use self::core::Config;
pub use observability::ObservabilityConfig;
pub use processing::ProcessingConfig;
