pub mod log;
pub mod multi;
pub mod noop;
pub mod traits;

pub use self::log::LogObserver;
pub use multi::MultiObserver;
pub use noop::NoopObserver;
pub use traits::{Observer, ObserverEvent, ObserverMetric};

use crate::config::ObservabilityConfig;

/// Factory: create the right observer from config.
///
/// A comma-separated backend list (`"log,noop"`) fans out through
/// [`MultiObserver`].
pub fn create_observer(config: &ObservabilityConfig) -> Box<dyn Observer> {
    let backends: Vec<&str> = config
        .backend
        .split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();
    match backends.as_slice() {
        [] => backend_observer(""),
        [single] => backend_observer(single),
        many => Box::new(MultiObserver::new(
            many.iter().map(|b| backend_observer(b)).collect(),
        )),
    }
}

fn backend_observer(backend: &str) -> Box<dyn Observer> {
    match backend {
        "log" => Box::new(LogObserver::new()),
        "none" | "noop" => Box::new(NoopObserver),
        _ => {
            tracing::warn!(
                "Unknown observability backend '{}', falling back to noop",
                backend
            );
            Box::new(NoopObserver)
        }
    }
}
