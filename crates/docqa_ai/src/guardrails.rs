use docqa_core::config::GroundingConfig;
use docqa_core::domain::Fact;

/// Trimmed model output, or `None` when it is empty or admits the answer is not available.
pub fn screen_model_output(output: &str, config: &GroundingConfig) -> Option<String> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return None;
    }
    let marker = config.not_available_marker.to_lowercase();
    if !marker.is_empty() && trimmed.to_lowercase().contains(&marker) {
        return None;
    }
    Some(trimmed.to_string())
}

/// True when `text` is lifted verbatim from the facts: a substring of one fact, or their
/// space-joined concatenation.
pub fn is_verbatim_from(text: &str, facts: &[Fact]) -> bool {
    if text.is_empty() || facts.is_empty() {
        return false;
    }
    if facts.iter().any(|f| f.content.contains(text)) {
        return true;
    }
    let joined = facts
        .iter()
        .map(|f| f.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    joined == text
}
