use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide routing counters. Every field only ever increases.
#[derive(Debug, Default)]
pub(crate) struct GatekeeperCounters {
    pub(crate) total_requests: AtomicU64,
    pub(crate) safety_overrides: AtomicU64,
    pub(crate) circuit_breaker_trips: AtomicU64,
    pub(crate) anchor_mode_responses: AtomicU64,
    pub(crate) delegated_requests: AtomicU64,
    pub(crate) failed_requests: AtomicU64,
}

impl GatekeeperCounters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, active_open_circuits: usize) -> GatekeeperStats {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let failed_requests = self.failed_requests.load(Ordering::Relaxed);
        GatekeeperStats {
            total_requests,
            safety_overrides: self.safety_overrides.load(Ordering::Relaxed),
            circuit_breaker_trips: self.circuit_breaker_trips.load(Ordering::Relaxed),
            anchor_mode_responses: self.anchor_mode_responses.load(Ordering::Relaxed),
            delegated_requests: self.delegated_requests.load(Ordering::Relaxed),
            failed_requests,
            active_open_circuits: u64::try_from(active_open_circuits).unwrap_or(u64::MAX),
            success_rate: success_rate(total_requests, failed_requests),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatekeeperStats {
    pub total_requests: u64,
    pub safety_overrides: u64,
    pub circuit_breaker_trips: u64,
    pub anchor_mode_responses: u64,
    pub delegated_requests: u64,
    pub failed_requests: u64,
    pub active_open_circuits: u64,
    /// Share of requests that did not end in a processing failure.
    pub success_rate: f64,
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(total: u64, failed: u64) -> f64 {
    if total == 0 {
        return 1.0;
    }
    // A failure may be counted a moment before its request is; never report
    // more failures than requests.
    let failed = failed.min(total);
    (total - failed) as f64 / total as f64
}
