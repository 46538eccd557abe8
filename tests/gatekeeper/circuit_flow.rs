use super::gatekeeper_harness::{
    Mode, MockProcessor, RECOVERY, audited_gatekeeper, gatekeeper, registry, trip,
    wait_for_audit,
};
use cognitive_gatekeeper::core::gatekeeper::{
    ACTION_ANCHOR_MODE, ACTION_NORMAL_PROCESSING, ACTION_RECOVERY_TRIAL, ANCHOR_MODE_TEXT,
    NormalProcessor, ProcessorReply,
};
use cognitive_gatekeeper::security::AuditEventType;
use cognitive_gatekeeper::{Gatekeeper, ProcessorError, Route};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Outcome and latency come from the message: `"fail <ms>"` or `"ok <ms>"`.
struct ScriptedByText;

impl NormalProcessor for ScriptedByText {
    fn process<'a>(
        &'a self,
        _user_id: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessorReply, ProcessorError>> + Send + 'a>> {
        Box::pin(async move {
            let (verdict, millis) = text.split_once(' ').unwrap_or((text, "0"));
            let millis = millis.parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(millis)).await;
            if verdict == "fail" {
                return Err(ProcessorError::Failed("scripted failure".into()));
            }
            Ok(ProcessorReply {
                source: "llm".into(),
                confidence: 0.9,
                text: text.to_string(),
            })
        })
    }
}

async fn tripped_scripted_gatekeeper(user: &str) -> Gatekeeper {
    let processor: Arc<dyn NormalProcessor> = Arc::new(ScriptedByText);
    let gatekeeper = Gatekeeper::new(processor, registry());
    for _ in 0..3 {
        gatekeeper.handle(user, "fail 0").await.unwrap();
    }
    assert!(gatekeeper.breakers().get_or_create(user).is_open);
    gatekeeper
}

#[tokio::test]
async fn third_failure_opens_and_fourth_call_is_anchored() {
    let processor = MockProcessor::new(Mode::Fail);
    let gatekeeper = gatekeeper(&processor);

    trip(&gatekeeper, &processor, "user_1").await;
    assert_eq!(processor.calls(), 3);

    let result = gatekeeper.handle("user_1", "what now?").await.unwrap();

    assert_eq!(result.actions_taken, vec![ACTION_ANCHOR_MODE.to_string()]);
    assert_eq!(result.route, Route::AnchorMode);
    assert_eq!(result.response, ANCHOR_MODE_TEXT);
    assert!(result.success);
    assert_eq!(processor.calls(), 3);
}

#[tokio::test]
async fn success_between_failures_resets_the_count() {
    let processor = MockProcessor::new(Mode::Fail);
    let gatekeeper = gatekeeper(&processor);

    gatekeeper.handle("user_2", "one").await.unwrap();
    gatekeeper.handle("user_2", "two").await.unwrap();
    processor.set_mode(Mode::Succeed);
    gatekeeper.handle("user_2", "three").await.unwrap();
    processor.set_mode(Mode::Fail);
    gatekeeper.handle("user_2", "four").await.unwrap();
    gatekeeper.handle("user_2", "five").await.unwrap();

    let state = gatekeeper.breakers().get_or_create("user_2");
    assert!(!state.is_open);
    assert_eq!(state.failure_count, 2);
}

#[tokio::test]
async fn breakers_are_isolated_per_user() {
    let processor = MockProcessor::new(Mode::Fail);
    let gatekeeper = gatekeeper(&processor);
    trip(&gatekeeper, &processor, "user_a").await;

    processor.set_mode(Mode::Succeed);
    let result = gatekeeper.handle("user_b", "hello").await.unwrap();

    assert_eq!(result.route, Route::Processed);
    assert!(gatekeeper.breakers().get_or_create("user_a").is_open);
    assert!(!gatekeeper.breakers().get_or_create("user_b").is_open);
}

#[tokio::test(start_paused = true)]
async fn anchored_until_recovery_window_elapses() {
    let processor = MockProcessor::new(Mode::Fail);
    let gatekeeper = gatekeeper(&processor);
    trip(&gatekeeper, &processor, "user_3").await;
    processor.set_mode(Mode::Succeed);

    tokio::time::advance(RECOVERY - Duration::from_secs(1)).await;
    let result = gatekeeper.handle("user_3", "still there?").await.unwrap();
    assert_eq!(result.route, Route::AnchorMode);
    assert_eq!(processor.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn successful_trial_closes_the_breaker() {
    let processor = MockProcessor::new(Mode::Fail);
    let gatekeeper = gatekeeper(&processor);
    trip(&gatekeeper, &processor, "user_4").await;
    processor.set_mode(Mode::Succeed);

    tokio::time::advance(RECOVERY).await;
    let trial = gatekeeper.handle("user_4", "try again").await.unwrap();

    assert_eq!(trial.route, Route::Processed);
    assert!(trial.has_action(ACTION_NORMAL_PROCESSING));
    assert!(trial.has_action(ACTION_RECOVERY_TRIAL));
    assert_eq!(processor.calls(), 4);

    let state = gatekeeper.breakers().get_or_create("user_4");
    assert!(!state.is_open);
    assert_eq!(state.failure_count, 0);

    let next = gatekeeper.handle("user_4", "and again").await.unwrap();
    assert_eq!(next.actions_taken, vec![ACTION_NORMAL_PROCESSING.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn failed_trial_reopens_for_a_fresh_window() {
    let processor = MockProcessor::new(Mode::Fail);
    let gatekeeper = gatekeeper(&processor);
    trip(&gatekeeper, &processor, "user_5").await;

    tokio::time::advance(RECOVERY).await;
    let trial = gatekeeper.handle("user_5", "try again").await.unwrap();
    assert_eq!(trial.route, Route::Failed);
    assert!(trial.has_action(ACTION_RECOVERY_TRIAL));

    let state = gatekeeper.breakers().get_or_create("user_5");
    assert!(state.is_open);
    assert_eq!(state.failure_count, 4);

    let anchored = gatekeeper.handle("user_5", "hello?").await.unwrap();
    assert_eq!(anchored.route, Route::AnchorMode);
    assert_eq!(processor.calls(), 4);

    // The window restarted at the failed trial, not at the original trip.
    tokio::time::advance(RECOVERY - Duration::from_secs(1)).await;
    let still_anchored = gatekeeper.handle("user_5", "hello?").await.unwrap();
    assert_eq!(still_anchored.route, Route::AnchorMode);

    tokio::time::advance(Duration::from_secs(1)).await;
    processor.set_mode(Mode::Succeed);
    let recovered = gatekeeper.handle("user_5", "hello?").await.unwrap();
    assert_eq!(recovered.route, Route::Processed);
}

#[tokio::test(start_paused = true)]
async fn concurrent_trials_are_all_admitted() {
    let processor = MockProcessor::new(Mode::Fail);
    let gatekeeper = gatekeeper(&processor);
    trip(&gatekeeper, &processor, "user_6").await;
    processor.set_mode(Mode::Slow(Duration::from_millis(50)));

    tokio::time::advance(RECOVERY).await;
    let (first, second) = tokio::join!(
        gatekeeper.handle("user_6", "first"),
        gatekeeper.handle("user_6", "second"),
    );

    assert!(first.unwrap().has_action(ACTION_RECOVERY_TRIAL));
    assert!(second.unwrap().has_action(ACTION_RECOVERY_TRIAL));
    assert_eq!(processor.calls(), 5);
    assert!(!gatekeeper.breakers().get_or_create("user_6").is_open);
}

#[tokio::test]
async fn trips_are_counted_and_audited() {
    let processor = MockProcessor::new(Mode::Fail);
    let (gatekeeper, audit) = audited_gatekeeper(&processor);

    trip(&gatekeeper, &processor, "user_7").await;
    wait_for_audit(&audit, 1).await;

    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, AuditEventType::CircuitTrip);
    assert_eq!(events[0].user_id, "user_7");

    let stats = gatekeeper.get_stats();
    assert_eq!(stats.circuit_breaker_trips, 1);
    assert_eq!(stats.active_open_circuits, 1);
}

#[tokio::test(start_paused = true)]
async fn later_trial_success_closes_after_earlier_trial_reopens() {
    let gatekeeper = tripped_scripted_gatekeeper("user_8").await;
    tokio::time::advance(RECOVERY).await;

    let (failed, succeeded) = tokio::join!(
        gatekeeper.handle("user_8", "fail 10"),
        gatekeeper.handle("user_8", "ok 50"),
    );
    let failed = failed.unwrap();
    let succeeded = succeeded.unwrap();

    assert_eq!(failed.route, Route::Failed);
    assert!(failed.has_action(ACTION_RECOVERY_TRIAL));
    assert_eq!(succeeded.route, Route::Processed);
    assert!(succeeded.has_action(ACTION_RECOVERY_TRIAL));

    let state = gatekeeper.breakers().get_or_create("user_8");
    assert!(!state.is_open);
    assert_eq!(state.failure_count, 0);
    assert!(state.next_test_time.is_none());
}

#[tokio::test(start_paused = true)]
async fn later_trial_failure_after_recovery_only_counts() {
    let gatekeeper = tripped_scripted_gatekeeper("user_9").await;
    tokio::time::advance(RECOVERY).await;

    let (succeeded, failed) = tokio::join!(
        gatekeeper.handle("user_9", "ok 10"),
        gatekeeper.handle("user_9", "fail 50"),
    );
    assert_eq!(succeeded.unwrap().route, Route::Processed);
    assert_eq!(failed.unwrap().route, Route::Failed);

    let state = gatekeeper.breakers().get_or_create("user_9");
    assert!(!state.is_open);
    assert_eq!(state.failure_count, 1);

    let next = gatekeeper.handle("user_9", "ok 0").await.unwrap();
    assert_eq!(next.actions_taken, vec![ACTION_NORMAL_PROCESSING.to_string()]);
}
