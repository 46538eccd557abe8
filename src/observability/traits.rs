use crate::core::gatekeeper::BreakerTransition;
use crate::security::crisis::CrisisType;
use std::time::Duration;

/// Routing events the observer can record. None of them carry user text.
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    SafetyOverride {
        crisis_type: CrisisType,
    },
    AnchorMode {
        failure_count: u32,
    },
    Delegation {
        success: bool,
        trial: bool,
        duration: Duration,
    },
    CircuitTransition {
        transition: BreakerTransition,
        failure_count: u32,
    },
    BookkeepingError {
        component: String,
        message: String,
    },
}

/// Numeric metrics
#[derive(Debug, Clone)]
pub enum ObserverMetric {
    RouteLatency {
        route: &'static str,
        duration: Duration,
    },
    OpenCircuits(u64),
}

/// Core observability trait — implement for any backend
pub trait Observer: Send + Sync {
    /// Record a discrete event
    fn record_event(&self, event: &ObserverEvent);

    /// Record a numeric metric
    fn record_metric(&self, metric: &ObserverMetric);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;
}
