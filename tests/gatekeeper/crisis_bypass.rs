use super::gatekeeper_harness::{Mode, MockProcessor, audited_gatekeeper, gatekeeper, trip, wait_for_audit};
use cognitive_gatekeeper::Route;
use cognitive_gatekeeper::core::gatekeeper::{ACTION_ANCHOR_MODE, ACTION_SAFETY_OVERRIDE};
use cognitive_gatekeeper::security::{AuditEventType, CrisisType};

#[tokio::test]
async fn crisis_text_never_reaches_processor() {
    let processor = MockProcessor::new(Mode::Succeed);
    let gatekeeper = gatekeeper(&processor);

    let result = gatekeeper
        .handle("user_1", "I want to kill myself")
        .await
        .unwrap();

    assert_eq!(processor.calls(), 0);
    assert_eq!(result.source, "hard_coded");
    assert!(result.response.contains("988"));
    assert!(result.response.contains("741741"));
    assert!(result.response.contains("911"));
    assert_eq!(result.actions_taken, vec![ACTION_SAFETY_OVERRIDE.to_string()]);
    assert_eq!(result.model_used.as_deref(), Some("safety_override"));
    assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    assert_eq!(
        result.route,
        Route::Crisis {
            crisis_type: CrisisType::SuicidalIdeation
        }
    );
}

#[tokio::test]
async fn crisis_wins_over_open_breaker() {
    let processor = MockProcessor::new(Mode::Fail);
    let gatekeeper = gatekeeper(&processor);
    trip(&gatekeeper, &processor, "user_2").await;
    let calls_before = processor.calls();

    let result = gatekeeper
        .handle("user_2", "I want to kill myself")
        .await
        .unwrap();

    assert_eq!(result.source, "hard_coded");
    assert!(result.response.contains("988"));
    assert!(result.has_action(ACTION_SAFETY_OVERRIDE));
    assert!(!result.has_action(ACTION_ANCHOR_MODE));
    assert_eq!(processor.calls(), calls_before);

    let state = gatekeeper.breakers().get_or_create("user_2");
    assert!(state.is_open);
    assert_eq!(state.failure_count, 3);
}

#[tokio::test]
async fn crisis_outcome_leaves_breaker_untouched() {
    let processor = MockProcessor::new(Mode::Fail);
    let gatekeeper = gatekeeper(&processor);
    gatekeeper.handle("user_3", "plan my morning").await.unwrap();

    for _ in 0..5 {
        gatekeeper
            .handle("user_3", "I've been cutting myself again")
            .await
            .unwrap();
    }

    let state = gatekeeper.breakers().get_or_create("user_3");
    assert_eq!(state.failure_count, 1);
    assert!(!state.is_open);
}

#[tokio::test]
async fn crisis_is_answered_even_without_a_user_id() {
    let processor = MockProcessor::new(Mode::Succeed);
    let gatekeeper = gatekeeper(&processor);

    let result = gatekeeper.handle("", "there's no reason to live").await;

    let result = result.expect("crisis text must never be refused");
    assert_eq!(result.source, "hard_coded");
    assert!(result.response.contains("988"));
}

#[tokio::test]
async fn hopelessness_gets_its_own_response() {
    let processor = MockProcessor::new(Mode::Succeed);
    let gatekeeper = gatekeeper(&processor);

    let result = gatekeeper
        .handle("user_4", "Honestly everything is hopeless")
        .await
        .unwrap();

    assert_eq!(
        result.route,
        Route::Crisis {
            crisis_type: CrisisType::Hopelessness
        }
    );
    assert!(result.response.contains("988"));
}

#[tokio::test]
async fn benign_idioms_are_delegated() {
    let processor = MockProcessor::new(Mode::Succeed);
    let gatekeeper = gatekeeper(&processor);

    for text in ["I'm dying to know how this ends", "you're killing it today"] {
        let result = gatekeeper.handle("user_5", text).await.unwrap();
        assert_eq!(result.route, Route::Processed, "{text}");
    }
    assert_eq!(processor.calls(), 2);
}

#[tokio::test]
async fn safety_override_is_audited_without_message_text() {
    let processor = MockProcessor::new(Mode::Succeed);
    let (gatekeeper, audit) = audited_gatekeeper(&processor);
    let text = "I want to hurt myself";

    let result = gatekeeper.handle("user_6", text).await.unwrap();
    wait_for_audit(&audit, 1).await;

    let events = audit.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event_type, AuditEventType::SafetyOverride);
    assert_eq!(event.user_id, "user_6");
    assert_eq!(event.request_id, result.request_id);
    assert_eq!(event.crisis_type, Some(CrisisType::SelfHarm));
    assert_eq!(event.response_source.as_deref(), Some("hard_coded"));

    let json = serde_json::to_string(event).unwrap();
    assert!(!json.contains(text));
}
