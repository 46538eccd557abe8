//! Safety-gated request routing.
//!
//! Every message goes through the same fixed order:
//! 1. crisis check (always, before anything else can refuse the request)
//! 2. per-user circuit breaker (anchor mode while open)
//! 3. delegation to the normal processor
//! 4. exactly one breaker outcome for the completed delegation

pub mod breaker;
pub mod load;
pub mod stats;
pub mod traits;
pub mod types;

pub use breaker::{
    BreakerPhase, BreakerPolicy, BreakerTransition, CircuitBreakerRegistry, CircuitBreakerState,
    DEFAULT_FAILURE_THRESHOLD, DEFAULT_RECOVERY_PERIOD,
};
pub use load::estimate_cognitive_load;
pub use stats::GatekeeperStats;
pub use traits::NormalProcessor;
pub use types::{
    ACTION_ANCHOR_MODE, ACTION_NORMAL_PROCESSING, ACTION_PROCESSING_FAILED,
    ACTION_RECOVERY_TRIAL, ACTION_SAFETY_OVERRIDE, ANCHOR_MODE_TEXT, FALLBACK_ERROR,
    FALLBACK_TEXT, ProcessingResult, ProcessorReply, Route,
};

use crate::config::Config;
use crate::error::{ConfigError, ContractError, ProcessorError};
use crate::observability::{NoopObserver, Observer, ObserverEvent, ObserverMetric, create_observer};
use crate::security::audit::{AuditEvent, AuditLog, create_audit_log};
use crate::security::crisis::{self, CrisisAssessment};
use futures_util::FutureExt;
use stats::GatekeeperCounters;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use types::{ANCHOR_MODE_SOURCE, FALLBACK_SOURCE};

const DEFAULT_MAX_USER_ID_LEN: usize = 256;

pub struct Gatekeeper {
    processor: Arc<dyn NormalProcessor>,
    breakers: Arc<CircuitBreakerRegistry>,
    audit: Option<Arc<dyn AuditLog>>,
    observer: Arc<dyn Observer>,
    counters: GatekeeperCounters,
    timeout: Option<Duration>,
    max_user_id_len: usize,
    audit_circuit_trips: bool,
}

impl Gatekeeper {
    /// Gatekeeper with no audit sink, a no-op observer and no delegation
    /// timeout. Use the `with_*` builders to attach collaborators.
    pub fn new(processor: Arc<dyn NormalProcessor>, breakers: Arc<CircuitBreakerRegistry>) -> Self {
        Self {
            processor,
            breakers,
            audit: None,
            observer: Arc::new(NoopObserver),
            counters: GatekeeperCounters::default(),
            timeout: None,
            max_user_id_len: DEFAULT_MAX_USER_ID_LEN,
            audit_circuit_trips: true,
        }
    }

    pub fn from_config(
        config: &Config,
        processor: Arc<dyn NormalProcessor>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let breakers = Arc::new(CircuitBreakerRegistry::new(config.circuit_breaker.policy()));
        let mut gatekeeper = Self::new(processor, breakers)
            .with_observer(Arc::from(create_observer(&config.observability)));
        gatekeeper.audit = create_audit_log(&config.audit);
        gatekeeper.audit_circuit_trips = config.audit.record_circuit_trips;
        gatekeeper.timeout = config.processing.timeout_secs.map(Duration::from_secs);
        gatekeeper.max_user_id_len = config.processing.max_user_id_len;
        Ok(gatekeeper)
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.breakers
    }

    /// Route one user message.
    ///
    /// Crisis, anchor mode and collaborator failures all come back as `Ok`.
    /// `Err` is reserved for caller contract violations, and is only possible
    /// once the crisis check has already cleared the text.
    pub async fn handle(&self, user_id: &str, text: &str) -> Result<ProcessingResult, ContractError> {
        let started = Instant::now();
        let request_id = uuid::Uuid::new_v4().to_string();

        let assessment = crisis::assess(text);
        if assessment.is_crisis {
            return Ok(self.safety_override(user_id, &request_id, &assessment, started));
        }

        self.validate_user_id(user_id)?;
        GatekeeperCounters::bump(&self.counters.total_requests);

        let trial = match self.breaker_phase(user_id) {
            Some(BreakerPhase::Open) => {
                return Ok(self.anchor_mode(user_id, &request_id, started));
            }
            Some(BreakerPhase::OpenTesting) => true,
            Some(BreakerPhase::Closed) | None => false,
        };

        // Dropping this future mid-delegation skips everything below, so a
        // cancelled request never records an outcome.
        let delegation_started = Instant::now();
        let outcome = self.delegate(user_id, text).await;
        GatekeeperCounters::bump(&self.counters.delegated_requests);
        self.observer.record_event(&ObserverEvent::Delegation {
            success: outcome.is_ok(),
            trial,
            duration: delegation_started.elapsed(),
        });

        self.record_outcome(user_id, &request_id, outcome.is_ok());

        let result = match outcome {
            Ok(reply) => self.processed(request_id, reply, trial, started),
            Err(err) => self.failed(user_id, request_id, &err, trial, started),
        };
        self.observer.record_metric(&ObserverMetric::RouteLatency {
            route: result.route.as_str(),
            duration: started.elapsed(),
        });
        Ok(result)
    }

    /// Read-only snapshot of the process-wide counters.
    pub fn get_stats(&self) -> GatekeeperStats {
        self.counters.snapshot(self.breakers.open_circuits())
    }

    /// Events the configured audit sink can hand back. Empty for write-only
    /// sinks or when auditing is off.
    pub fn recent_audit_events(&self) -> Vec<AuditEvent> {
        self.audit.as_ref().map(|audit| audit.recent()).unwrap_or_default()
    }

    fn validate_user_id(&self, user_id: &str) -> Result<(), ContractError> {
        if user_id.trim().is_empty() {
            return Err(ContractError::EmptyUserId);
        }
        if user_id.chars().count() > self.max_user_id_len {
            return Err(ContractError::UserIdTooLong {
                max: self.max_user_id_len,
            });
        }
        Ok(())
    }

    fn safety_override(
        &self,
        user_id: &str,
        request_id: &str,
        assessment: &CrisisAssessment,
        started: Instant,
    ) -> ProcessingResult {
        GatekeeperCounters::bump(&self.counters.total_requests);
        GatekeeperCounters::bump(&self.counters.safety_overrides);

        let response = crisis::respond(assessment);
        tracing::warn!(
            user_id = %user_id,
            request_id = %request_id,
            crisis_type = %assessment.crisis_type,
            route = "crisis",
            "Safety override engaged"
        );
        self.observer.record_event(&ObserverEvent::SafetyOverride {
            crisis_type: assessment.crisis_type,
        });
        self.spawn_audit(AuditEvent::safety_override(
            user_id,
            request_id,
            assessment.crisis_type,
            response.source,
        ));

        let result = ProcessingResult {
            request_id: request_id.to_string(),
            route: Route::Crisis {
                crisis_type: assessment.crisis_type,
            },
            success: true,
            response: response.text.to_string(),
            source: response.source.to_string(),
            confidence: response.confidence,
            model_used: Some(response.model_used.to_string()),
            actions_taken: vec![ACTION_SAFETY_OVERRIDE.to_string()],
            cognitive_load: load::CRISIS_LOAD,
            processing_time_ms: elapsed_ms(started),
            error: None,
        };
        self.observer.record_metric(&ObserverMetric::RouteLatency {
            route: result.route.as_str(),
            duration: started.elapsed(),
        });
        result
    }

    fn anchor_mode(&self, user_id: &str, request_id: &str, started: Instant) -> ProcessingResult {
        GatekeeperCounters::bump(&self.counters.anchor_mode_responses);
        let failure_count = self
            .breakers
            .snapshot(user_id)
            .map_or(0, |state| state.failure_count);
        tracing::info!(
            user_id = %user_id,
            request_id = %request_id,
            failure_count = failure_count,
            route = "anchor_mode",
            "Circuit open; answering in anchor mode"
        );
        self.observer
            .record_event(&ObserverEvent::AnchorMode { failure_count });

        let result = ProcessingResult {
            request_id: request_id.to_string(),
            route: Route::AnchorMode,
            success: true,
            response: ANCHOR_MODE_TEXT.to_string(),
            source: ANCHOR_MODE_SOURCE.to_string(),
            confidence: 1.0,
            model_used: None,
            actions_taken: vec![ACTION_ANCHOR_MODE.to_string()],
            cognitive_load: load::ANCHOR_MODE_LOAD,
            processing_time_ms: elapsed_ms(started),
            error: None,
        };
        self.observer.record_metric(&ObserverMetric::RouteLatency {
            route: result.route.as_str(),
            duration: started.elapsed(),
        });
        result
    }

    fn processed(
        &self,
        request_id: String,
        reply: ProcessorReply,
        trial: bool,
        started: Instant,
    ) -> ProcessingResult {
        let mut actions_taken = vec![ACTION_NORMAL_PROCESSING.to_string()];
        if trial {
            actions_taken.push(ACTION_RECOVERY_TRIAL.to_string());
        }
        ProcessingResult {
            request_id,
            route: Route::Processed,
            success: true,
            cognitive_load: estimate_cognitive_load(&reply.text),
            response: reply.text,
            source: reply.source,
            confidence: reply.confidence,
            model_used: None,
            actions_taken,
            processing_time_ms: elapsed_ms(started),
            error: None,
        }
    }

    fn failed(
        &self,
        user_id: &str,
        request_id: String,
        err: &ProcessorError,
        trial: bool,
        started: Instant,
    ) -> ProcessingResult {
        GatekeeperCounters::bump(&self.counters.failed_requests);
        tracing::warn!(
            user_id = %user_id,
            request_id = %request_id,
            processor = %self.processor.name(),
            route = "failed",
            "Normal processing failed: {err}"
        );

        let mut actions_taken = vec![
            ACTION_NORMAL_PROCESSING.to_string(),
            ACTION_PROCESSING_FAILED.to_string(),
        ];
        if trial {
            actions_taken.push(ACTION_RECOVERY_TRIAL.to_string());
        }
        ProcessingResult {
            request_id,
            route: Route::Failed,
            success: false,
            response: FALLBACK_TEXT.to_string(),
            source: FALLBACK_SOURCE.to_string(),
            confidence: 0.0,
            model_used: None,
            actions_taken,
            cognitive_load: load::FALLBACK_LOAD,
            processing_time_ms: elapsed_ms(started),
            error: Some(FALLBACK_ERROR.to_string()),
        }
    }

    async fn delegate(&self, user_id: &str, text: &str) -> Result<ProcessorReply, ProcessorError> {
        // `process` itself runs inside the guard, so a panic while building
        // the future is caught too.
        let call =
            AssertUnwindSafe(async move { self.processor.process(user_id, text).await })
                .catch_unwind();
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(ProcessorError::Timeout {
                        secs: limit.as_secs(),
                    });
                }
            },
            None => call.await,
        };
        outcome.unwrap_or(Err(ProcessorError::Panicked))
    }

    /// Current breaker phase. A bookkeeping fault is logged and treated as
    /// closed so the message still gets an answer.
    fn breaker_phase(&self, user_id: &str) -> Option<BreakerPhase> {
        let lookup = std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.breakers.get_or_create(user_id).phase(Instant::now())
        }));
        match lookup {
            Ok(phase) => Some(phase),
            Err(_) => {
                self.bookkeeping_error(user_id, "breaker lookup panicked");
                None
            }
        }
    }

    fn record_outcome(&self, user_id: &str, request_id: &str, success: bool) {
        let recorded = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let transition = self.breakers.record_outcome(user_id, success);
            let failure_count = self
                .breakers
                .snapshot(user_id)
                .map_or(0, |state| state.failure_count);
            (transition, failure_count)
        }));
        let Ok((transition, failure_count)) = recorded else {
            self.bookkeeping_error(user_id, "breaker outcome panicked");
            return;
        };

        if matches!(transition, BreakerTransition::None) {
            return;
        }
        tracing::info!(
            user_id = %user_id,
            request_id = %request_id,
            transition = %transition,
            failure_count = failure_count,
            "Circuit breaker updated"
        );
        self.observer.record_event(&ObserverEvent::CircuitTransition {
            transition,
            failure_count,
        });
        if matches!(
            transition,
            BreakerTransition::Tripped | BreakerTransition::Recovered
        ) {
            let open = u64::try_from(self.breakers.open_circuits()).unwrap_or(u64::MAX);
            self.observer
                .record_metric(&ObserverMetric::OpenCircuits(open));
        }

        if transition == BreakerTransition::Tripped {
            GatekeeperCounters::bump(&self.counters.circuit_breaker_trips);
            tracing::warn!(user_id = %user_id, "Circuit breaker tripped");
            if self.audit_circuit_trips {
                self.spawn_audit(AuditEvent::circuit_trip(user_id, request_id));
            }
        }
    }

    /// Hand the event to the audit sink without waiting on it.
    fn spawn_audit(&self, event: AuditEvent) {
        let Some(audit) = self.audit.as_ref().map(Arc::clone) else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.bookkeeping_error(&event.user_id, "no async runtime for audit");
            return;
        };
        runtime.spawn(async move {
            if let Err(err) = audit.record(&event).await {
                tracing::error!(
                    sink = %audit.name(),
                    event_type = %event.event_type,
                    "Audit record failed: {err}"
                );
            }
        });
    }

    fn bookkeeping_error(&self, user_id: &str, message: &str) {
        tracing::error!(user_id = %user_id, "Gatekeeper bookkeeping error: {message}");
        self.observer.record_event(&ObserverEvent::BookkeepingError {
            component: "gatekeeper".into(),
            message: message.into(),
        });
    }
}

impl std::fmt::Debug for Gatekeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gatekeeper")
            .field("processor", &self.processor.name())
            .field("observer", &self.observer.name())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
