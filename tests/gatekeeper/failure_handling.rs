use super::gatekeeper_harness::{Mode, MockProcessor, registry};
use cognitive_gatekeeper::core::gatekeeper::{
    ACTION_NORMAL_PROCESSING, ACTION_PROCESSING_FAILED, FALLBACK_ERROR, FALLBACK_TEXT,
    NormalProcessor, ProcessorReply,
};
use cognitive_gatekeeper::{ContractError, Gatekeeper, ProcessorError, Route};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Panics in `process` itself, before any future exists.
struct EagerPanicProcessor;

impl NormalProcessor for EagerPanicProcessor {
    fn process<'a>(
        &'a self,
        _user_id: &'a str,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessorReply, ProcessorError>> + Send + 'a>> {
        panic!("processor failed before building its future")
    }
}

fn gatekeeper_with_timeout(processor: &Arc<MockProcessor>, timeout: Duration) -> Gatekeeper {
    let processor: Arc<dyn NormalProcessor> = processor.clone();
    Gatekeeper::new(processor, registry()).with_timeout(timeout)
}

#[tokio::test]
async fn processor_error_becomes_calm_fallback() {
    let processor = MockProcessor::new(Mode::Fail);
    let gatekeeper = super::gatekeeper_harness::gatekeeper(&processor);

    let result = gatekeeper.handle("user_1", "sort my inbox").await.unwrap();

    assert!(!result.success);
    assert_eq!(result.route, Route::Failed);
    assert_eq!(result.response, FALLBACK_TEXT);
    assert_eq!(result.source, "fallback");
    assert_eq!(result.error.as_deref(), Some(FALLBACK_ERROR));
    assert!(!result.response.contains("503"));
    assert_eq!(
        result.actions_taken,
        vec![
            ACTION_NORMAL_PROCESSING.to_string(),
            ACTION_PROCESSING_FAILED.to_string()
        ]
    );
}

#[tokio::test]
async fn processor_panic_counts_as_one_failure() {
    let processor = MockProcessor::new(Mode::Panic);
    let gatekeeper = super::gatekeeper_harness::gatekeeper(&processor);

    let result = gatekeeper.handle("user_2", "sort my inbox").await.unwrap();

    assert_eq!(result.route, Route::Failed);
    assert_eq!(
        gatekeeper.breakers().get_or_create("user_2").failure_count,
        1
    );
}

#[tokio::test]
async fn eager_processor_panic_is_contained() {
    let processor: Arc<dyn NormalProcessor> = Arc::new(EagerPanicProcessor);
    let gatekeeper = Arc::new(Gatekeeper::new(processor, registry()));

    let task = {
        let gatekeeper = Arc::clone(&gatekeeper);
        tokio::spawn(async move { gatekeeper.handle("user_5", "sort my inbox").await })
    };
    let result = task
        .await
        .expect("panic must not escape handle")
        .unwrap();

    assert_eq!(result.route, Route::Failed);
    assert_eq!(result.response, FALLBACK_TEXT);
    assert_eq!(
        gatekeeper.breakers().snapshot("user_5").map(|s| s.failure_count),
        Some(1)
    );
    assert_eq!(gatekeeper.get_stats().failed_requests, 1);
}

#[tokio::test(start_paused = true)]
async fn processor_timeout_counts_as_failure() {
    let processor = MockProcessor::new(Mode::Hang);
    let gatekeeper = gatekeeper_with_timeout(&processor, Duration::from_secs(30));

    let result = gatekeeper.handle("user_3", "sort my inbox").await.unwrap();

    assert_eq!(result.route, Route::Failed);
    assert_eq!(result.error.as_deref(), Some(FALLBACK_ERROR));
    assert_eq!(
        gatekeeper.breakers().get_or_create("user_3").failure_count,
        1
    );
}

#[tokio::test(start_paused = true)]
async fn slow_reply_within_timeout_succeeds() {
    let processor = MockProcessor::new(Mode::Slow(Duration::from_secs(5)));
    let gatekeeper = gatekeeper_with_timeout(&processor, Duration::from_secs(30));

    let result = gatekeeper.handle("user_4", "sort my inbox").await.unwrap();

    assert_eq!(result.route, Route::Processed);
    assert_eq!(result.response, "ok: sort my inbox");
}

#[tokio::test]
async fn invalid_user_ids_are_refused_before_delegation() {
    let processor = MockProcessor::new(Mode::Succeed);
    let gatekeeper = super::gatekeeper_harness::gatekeeper(&processor);

    let empty = gatekeeper.handle("   ", "hello").await.unwrap_err();
    assert_eq!(empty, ContractError::EmptyUserId);

    let long_id = "u".repeat(257);
    let too_long = gatekeeper.handle(&long_id, "hello").await.unwrap_err();
    assert_eq!(too_long, ContractError::UserIdTooLong { max: 256 });

    assert_eq!(processor.calls(), 0);
    assert_eq!(gatekeeper.get_stats().total_requests, 0);
    assert!(gatekeeper.breakers().is_empty());
}
