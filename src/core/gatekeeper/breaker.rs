use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::time::{Duration, Instant};

pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_RECOVERY_PERIOD: Duration = Duration::from_secs(2 * 60 * 60);

/// Trip threshold and recovery window shared by every per-user breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerPolicy {
    pub failure_threshold: u32,
    pub recovery_period: Duration,
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            recovery_period: DEFAULT_RECOVERY_PERIOD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BreakerPhase {
    Closed,
    Open,
    /// Open, but the recovery window has elapsed; the next request is a trial.
    OpenTesting,
}

/// What a recorded outcome did to the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BreakerTransition {
    /// Success on an already clean breaker.
    None,
    /// Failure recorded without changing the open/closed state.
    Counted,
    /// Closed -> open.
    Tripped,
    /// Trial failed; open again with a fresh window.
    Reopened,
    /// Open -> closed after a success.
    Recovered,
    /// Success cleared a partial failure count while closed.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerState {
    pub user_id: String,
    pub is_open: bool,
    pub failure_count: u32,
    pub last_failure: Option<Instant>,
    pub next_test_time: Option<Instant>,
}

impl CircuitBreakerState {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            is_open: false,
            failure_count: 0,
            last_failure: None,
            next_test_time: None,
        }
    }

    pub fn phase(&self, now: Instant) -> BreakerPhase {
        if !self.is_open {
            return BreakerPhase::Closed;
        }
        match self.next_test_time {
            Some(test_at) if now >= test_at => BreakerPhase::OpenTesting,
            _ => BreakerPhase::Open,
        }
    }

    fn record_success(&mut self) -> BreakerTransition {
        let transition = if self.is_open {
            BreakerTransition::Recovered
        } else if self.failure_count > 0 {
            BreakerTransition::Reset
        } else {
            BreakerTransition::None
        };
        self.is_open = false;
        self.failure_count = 0;
        self.last_failure = None;
        self.next_test_time = None;
        transition
    }

    fn record_failure(&mut self, now: Instant, policy: &BreakerPolicy) -> BreakerTransition {
        self.failure_count = self.failure_count.saturating_add(1);
        self.last_failure = Some(now);

        match self.phase(now) {
            BreakerPhase::Closed if self.failure_count >= policy.failure_threshold.max(1) => {
                self.is_open = true;
                self.next_test_time = Some(now + policy.recovery_period);
                BreakerTransition::Tripped
            }
            BreakerPhase::OpenTesting => {
                self.next_test_time = Some(now + policy.recovery_period);
                BreakerTransition::Reopened
            }
            // A straggler that started before the trip keeps the current window.
            BreakerPhase::Closed | BreakerPhase::Open => BreakerTransition::Counted,
        }
    }
}

/// Per-user breakers keyed by user id.
///
/// The outer map lock is only taken for lookup and insertion; each user's
/// state sits behind its own mutex, so users never contend with each other on
/// outcome bookkeeping. No lock is ever held across an await point.
/// Entries live for the life of the registry.
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    breakers: RwLock<HashMap<String, Arc<Mutex<CircuitBreakerState>>>>,
    policy: BreakerPolicy,
}

impl CircuitBreakerRegistry {
    pub fn new(policy: BreakerPolicy) -> Self {
        Self {
            breakers: RwLock::new(HashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> BreakerPolicy {
        self.policy
    }

    fn entry(&self, user_id: &str) -> Arc<Mutex<CircuitBreakerState>> {
        {
            let breakers = self
                .breakers
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(state) = breakers.get(user_id) {
                return Arc::clone(state);
            }
        }

        let mut breakers = self
            .breakers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(
            breakers
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(CircuitBreakerState::new(user_id)))),
        )
    }

    /// Snapshot of the user's breaker, creating a closed one on first sight.
    pub fn get_or_create(&self, user_id: &str) -> CircuitBreakerState {
        let entry = self.entry(user_id);
        let state = entry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.clone()
    }

    /// Snapshot without creating an entry.
    pub fn snapshot(&self, user_id: &str) -> Option<CircuitBreakerState> {
        let breakers = self
            .breakers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        breakers.get(user_id).map(|state| {
            state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        })
    }

    pub fn record_outcome(&self, user_id: &str, success: bool) -> BreakerTransition {
        self.record_outcome_at(user_id, success, Instant::now())
    }

    pub fn record_outcome_at(
        &self,
        user_id: &str,
        success: bool,
        now: Instant,
    ) -> BreakerTransition {
        let entry = self.entry(user_id);
        let mut state = entry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if success {
            state.record_success()
        } else {
            state.record_failure(now, &self.policy)
        }
    }

    /// Operator override: close the user's breaker immediately.
    /// Returns `false` when the user has no breaker yet.
    pub fn reset(&self, user_id: &str) -> bool {
        let breakers = self
            .breakers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(entry) = breakers.get(user_id) else {
            return false;
        };
        entry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .record_success();
        true
    }

    pub fn open_circuits(&self) -> usize {
        let breakers = self
            .breakers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        breakers
            .values()
            .filter(|state| {
                state
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .is_open
            })
            .count()
    }

    pub fn len(&self) -> usize {
        self.breakers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
