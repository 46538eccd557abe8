//! Deterministic crisis detection and the fixed safety responses that replace
//! generative processing when it fires.

pub mod detector;
pub mod responder;

pub use detector::{CrisisAssessment, CrisisType, PATTERN_MATCH_SOURCE, assess};
pub use responder::{
    CRISIS_HOTLINE, CRISIS_TEXT_CODE, EMERGENCY_NUMBER, HARD_CODED_SOURCE, SAFETY_OVERRIDE_MODEL,
    SafetyResponse, respond, safety_text,
};
