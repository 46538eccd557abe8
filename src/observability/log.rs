use super::traits::{Observer, ObserverEvent, ObserverMetric};
use tracing::{info, warn};

/// Log-based observer — uses tracing, zero external deps
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::SafetyOverride { crisis_type } => {
                info!(crisis_type = %crisis_type, "gatekeeper.safety_override");
            }
            ObserverEvent::AnchorMode { failure_count } => {
                info!(failure_count = failure_count, "gatekeeper.anchor_mode");
            }
            ObserverEvent::Delegation {
                success,
                trial,
                duration,
            } => {
                let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                info!(
                    success = success,
                    trial = trial,
                    duration_ms = ms,
                    "gatekeeper.delegation"
                );
            }
            ObserverEvent::CircuitTransition {
                transition,
                failure_count,
            } => {
                info!(
                    transition = %transition,
                    failure_count = failure_count,
                    "gatekeeper.circuit_transition"
                );
            }
            ObserverEvent::BookkeepingError { component, message } => {
                warn!(component = %component, error = %message, "gatekeeper.bookkeeping_error");
            }
        }
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        match metric {
            ObserverMetric::RouteLatency { route, duration } => {
                let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                info!(route = %route, latency_ms = ms, "metric.route_latency");
            }
            ObserverMetric::OpenCircuits(count) => {
                info!(open_circuits = count, "metric.open_circuits");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
