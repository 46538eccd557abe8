/// Cognitive load of crisis responses: short, fixed, single clear ask.
pub const CRISIS_LOAD: f64 = 0.1;
/// Anchor mode asks nothing of the user.
pub const ANCHOR_MODE_LOAD: f64 = 0.1;
pub const FALLBACK_LOAD: f64 = 0.2;

const WORDS_FOR_FULL_LENGTH: f64 = 300.0;
const WORDS_PER_SENTENCE_FOR_FULL_DENSITY: f64 = 30.0;
const LIST_ITEMS_FOR_FULL_LOAD: f64 = 10.0;

/// Rough reading effort of a reply: overall length, sentence density and
/// how many list items the reader must track. Deterministic, clamped to 0..=1.
#[allow(clippy::cast_precision_loss)]
pub fn estimate_cognitive_load(text: &str) -> f64 {
    let words = text.split_whitespace().count();
    if words == 0 {
        return 0.0;
    }

    let sentences = text
        .split(['.', '!', '?', '\n'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let list_items = text.lines().filter(|line| is_list_item(line)).count();

    let length = (words as f64 / WORDS_FOR_FULL_LENGTH).min(1.0);
    let density = (words as f64 / sentences as f64 / WORDS_PER_SENTENCE_FOR_FULL_DENSITY).min(1.0);
    let lists = (list_items as f64 / LIST_ITEMS_FOR_FULL_LOAD).min(1.0);

    (0.5 * length + 0.3 * density + 0.2 * lists).clamp(0.0, 1.0)
}

fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with("- ") || trimmed.starts_with("* ") || trimmed.starts_with("• ") {
        return true;
    }
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && trimmed[digits..].starts_with(". ")
}
