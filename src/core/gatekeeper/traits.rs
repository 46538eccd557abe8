use super::types::ProcessorReply;
use crate::error::ProcessorError;
use std::future::Future;
use std::pin::Pin;

/// The general context-building and model pipeline that sits behind the
/// gatekeeper.
///
/// Implementations own their own timeouts. Any `Err` (or panic) is treated as
/// a processing failure and counted against the user's circuit breaker.
pub trait NormalProcessor: Send + Sync {
    fn process<'a>(
        &'a self,
        user_id: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessorReply, ProcessorError>> + Send + 'a>>;

    fn name(&self) -> &str {
        "processor"
    }
}
