use cognitive_gatekeeper::ProcessorError;
use cognitive_gatekeeper::core::gatekeeper::{NormalProcessor, ProcessorReply};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

/// Local stand-in for the model pipeline: echoes the message back, and can
/// fail on a fixed cadence so the breaker can be driven by hand.
pub struct EchoProcessor {
    calls: AtomicU64,
    fail_every: Option<u32>,
}

impl EchoProcessor {
    pub fn new(fail_every: Option<u32>) -> Self {
        Self {
            calls: AtomicU64::new(0),
            fail_every: fail_every.filter(|n| *n > 0),
        }
    }
}

impl NormalProcessor for EchoProcessor {
    fn process<'a>(
        &'a self,
        _user_id: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessorReply, ProcessorError>> + Send + 'a>> {
        Box::pin(async move {
            let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(every) = self.fail_every
                && call % u64::from(every) == 0
            {
                return Err(ProcessorError::Failed(format!("simulated failure #{call}")));
            }
            Ok(ProcessorReply {
                source: "echo".into(),
                confidence: 1.0,
                text: format!("You said: {text}"),
            })
        })
    }

    fn name(&self) -> &str {
        "echo"
    }
}
