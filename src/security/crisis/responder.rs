use super::detector::{CrisisAssessment, CrisisType};
use serde::Serialize;

pub const CRISIS_HOTLINE: &str = "988";
pub const CRISIS_TEXT_CODE: &str = "741741";
pub const EMERGENCY_NUMBER: &str = "911";

pub const HARD_CODED_SOURCE: &str = "hard_coded";
pub const SAFETY_OVERRIDE_MODEL: &str = "safety_override";

/// Appends the fixed resource block to an opening line. Every resource sits
/// on its own short numbered line so screen readers announce them one by one.
macro_rules! with_resources {
    ($opening:literal) => {
        concat!(
            $opening,
            "\n\n",
            "You don't have to handle this alone. Please reach out now:\n",
            "1. Call or text 988 (Suicide & Crisis Lifeline)\n",
            "2. Text HOME to 741741 (Crisis Text Line)\n",
            "3. Call 911 if you are in immediate danger\n",
            "\n",
            "I'm still here with you.",
        )
    };
}

const SELF_HARM_TEXT: &str = with_resources!(
    "Thank you for telling me. Your safety matters more than anything else right now."
);

const SUICIDAL_IDEATION_TEXT: &str = with_resources!(
    "I'm really glad you told me. What you're feeling is serious, and you deserve support right now."
);

const HOPELESSNESS_TEXT: &str = with_resources!(
    "That sounds incredibly heavy. Feeling like there's no way forward is exhausting."
);

const GENERAL_TEXT: &str = with_resources!("I want to make sure you're safe.");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyResponse {
    pub text: &'static str,
    pub source: &'static str,
    pub confidence: f64,
    pub model_used: &'static str,
    pub crisis_type: CrisisType,
}

/// Fixed safety message for an assessment. Never model-generated and never
/// carries anything about the user.
pub fn respond(assessment: &CrisisAssessment) -> SafetyResponse {
    SafetyResponse {
        text: safety_text(assessment.crisis_type),
        source: HARD_CODED_SOURCE,
        confidence: 1.0,
        model_used: SAFETY_OVERRIDE_MODEL,
        crisis_type: assessment.crisis_type,
    }
}

pub fn safety_text(crisis_type: CrisisType) -> &'static str {
    match crisis_type {
        CrisisType::SelfHarm => SELF_HARM_TEXT,
        CrisisType::SuicidalIdeation => SUICIDAL_IDEATION_TEXT,
        CrisisType::Hopelessness => HOPELESSNESS_TEXT,
        CrisisType::None => GENERAL_TEXT,
    }
}
