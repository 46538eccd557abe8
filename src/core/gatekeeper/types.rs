use crate::security::crisis::CrisisType;
use serde::Serialize;

pub const ACTION_SAFETY_OVERRIDE: &str = "safety_override";
pub const ACTION_ANCHOR_MODE: &str = "anchor_mode";
pub const ACTION_NORMAL_PROCESSING: &str = "normal_processing";
pub const ACTION_RECOVERY_TRIAL: &str = "recovery_trial";
pub const ACTION_PROCESSING_FAILED: &str = "processing_failed";

pub const ANCHOR_MODE_SOURCE: &str = "anchor_mode";
pub const FALLBACK_SOURCE: &str = "fallback";

pub const ANCHOR_MODE_TEXT: &str = "⚓ Anchor mode\n\
\n\
I'm keeping things simple for a little while.\n\
No action is needed from you.\n\
Take a slow breath. I'll still be here.";

pub const FALLBACK_TEXT: &str = "Something went wrong on my side, not yours.\n\
Nothing is needed from you right now.";

pub const FALLBACK_ERROR: &str = "normal processing is temporarily unavailable";

/// Which path a request took through the gatekeeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Route {
    Crisis { crisis_type: CrisisType },
    AnchorMode,
    Processed,
    Failed,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crisis { .. } => "crisis",
            Self::AnchorMode => "anchor_mode",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }
}

/// Narrow view of what the normal-processing pipeline hands back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessorReply {
    pub source: String,
    pub confidence: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    pub request_id: String,
    pub route: Route,
    pub success: bool,
    pub response: String,
    pub source: String,
    pub confidence: f64,
    pub model_used: Option<String>,
    pub actions_taken: Vec<String>,
    /// 0.0 (effortless) ..= 1.0 (demanding)
    pub cognitive_load: f64,
    pub processing_time_ms: u64,
    pub error: Option<String>,
}

impl ProcessingResult {
    pub fn has_action(&self, action: &str) -> bool {
        self.actions_taken.iter().any(|a| a == action)
    }
}
