use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const PATTERN_MATCH_SOURCE: &str = "pattern_match";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CrisisType {
    SelfHarm,
    SuicidalIdeation,
    Hopelessness,
    None,
}

impl CrisisType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelfHarm => "self_harm",
            Self::SuicidalIdeation => "suicidal_ideation",
            Self::Hopelessness => "hopelessness",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrisisAssessment {
    pub is_crisis: bool,
    /// Always exactly 0.0 or 1.0; matching is deterministic.
    pub confidence: f64,
    pub crisis_type: CrisisType,
    pub source: &'static str,
}

impl CrisisAssessment {
    pub fn clear() -> Self {
        Self {
            is_crisis: false,
            confidence: 0.0,
            crisis_type: CrisisType::None,
            source: PATTERN_MATCH_SOURCE,
        }
    }

    fn matched(crisis_type: CrisisType) -> Self {
        Self {
            is_crisis: true,
            confidence: 1.0,
            crisis_type,
            source: PATTERN_MATCH_SOURCE,
        }
    }
}

// Apostrophes may be straight, curly or missing ("dont").
const SELF_HARM_PHRASES: &[&str] = &[
    r"(?:hurt|hurting|harm|harming|cut|cutting|burn|burning|injure|injuring)\s+myself",
    r"self[\s-]?harm(?:ing)?",
];

const SUICIDAL_IDEATION_PHRASES: &[&str] = &[
    r"kill(?:ing)?\s+myself",
    r"end(?:ing)?\s+my\s+(?:own\s+)?life",
    r"take\s+my\s+(?:own\s+)?life",
    r"(?:want\s+to|wanna)\s+die",
    r"wish\s+i\s+(?:was|were)\s+dead",
    r"wish\s+i\s+(?:was|were|had)\s+never\s+(?:been\s+)?born",
    r"suicid(?:e|al)",
    r"better\s+off\s+dead",
    r"(?:everyone|everybody)\s+(?:would\s+be|is)\s+better\s+off\s+without\s+me",
    r"(?:don['’]?t|do\s+not)\s+want\s+to\s+(?:live|be\s+alive)",
    r"no\s+reason\s+to\s+live",
    r"no\s+point\s+(?:in\s+)?living",
    r"(?:not|isn['’]?t)\s+worth\s+living",
    r"(?:rather|better)\s+be\s+dead",
    r"(?:don['’]?t|do\s+not)\s+want\s+to\s+be\s+here\s+any\s?more",
    r"want\s+to\s+end\s+it",
    r"end\s+it\s+all",
];

const HOPELESSNESS_PHRASES: &[&str] = &[
    r"(?:can['’]?t|cannot|can\s+not)\s+go\s+on",
    r"(?:can['’]?t|cannot|can\s+not)\s+(?:do|take)\s+(?:this|it)\s+any\s?more",
    r"hopeless",
    r"(?:everything|life)\s+(?:is|feels)\s+(?:so\s+)?pointless",
    r"nothing\s+matters\s+any\s?more",
    r"no\s+(?:hope|point)\s+(?:left|any\s?more)",
    r"no\s+way\s+out",
    r"give\s+up\s+on\s+(?:everything|life)",
];

/// Phrase groups in priority order. The first group that matches wins,
/// regardless of where in the text its phrase sits.
static CRISIS_GROUPS: LazyLock<Vec<(CrisisType, Regex)>> = LazyLock::new(|| {
    [
        (CrisisType::SelfHarm, SELF_HARM_PHRASES),
        (CrisisType::SuicidalIdeation, SUICIDAL_IDEATION_PHRASES),
        (CrisisType::Hopelessness, HOPELESSNESS_PHRASES),
    ]
    .into_iter()
    .map(|(crisis_type, phrases)| (crisis_type, compile_group(phrases)))
    .collect()
});

// Whole-phrase alternation bounded by ASCII word boundaries on both sides,
// which keeps every group on the regex crate's linear-time DFA path.
fn compile_group(phrases: &[&str]) -> Regex {
    let pattern = format!(r"(?i)(?-u:\b)(?:{})(?-u:\b)", phrases.join("|"));
    Regex::new(&pattern).expect("built-in crisis phrase group must compile")
}

/// Deterministic crisis check over raw user text. Pure, no I/O.
pub fn assess(text: &str) -> CrisisAssessment {
    for (crisis_type, pattern) in CRISIS_GROUPS.iter() {
        if pattern.is_match(text) {
            return CrisisAssessment::matched(*crisis_type);
        }
    }
    CrisisAssessment::clear()
}
