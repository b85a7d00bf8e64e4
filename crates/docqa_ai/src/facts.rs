use std::collections::HashSet;

use docqa_core::config::FactRules;
use docqa_core::domain::{ContextPassage, Fact};
use docqa_core::normalize::word_count;

/// Splits passages into line-granular facts.
#[derive(Debug, Clone, Default)]
pub struct FactExtractor {
    rules: FactRules,
}

impl FactExtractor {
    pub fn new(rules: FactRules) -> Self {
        Self { rules }
    }

    /// Ordered, deduplicated fact lines of `text`.
    ///
    /// A bullet line counts once its marker is stripped and it still has `bullet_min_words`
    /// words. Any other line needs `line_min_words` words and must not start with an
    /// excluded prefix such as a markdown header.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut facts = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            let fact = if line.starts_with(self.rules.bullet_markers.as_slice()) {
                let cleaned = line
                    .trim_start_matches(|c: char| c == ' ' || self.rules.bullet_markers.contains(&c))
                    .trim();
                (!cleaned.is_empty() && word_count(cleaned) >= self.rules.bullet_min_words).then_some(cleaned)
            } else {
                let lower = line.to_lowercase();
                let excluded = self
                    .rules
                    .excluded_prefixes
                    .iter()
                    .any(|p| lower.starts_with(&p.to_lowercase()));
                (!line.is_empty() && word_count(line) >= self.rules.line_min_words && !excluded).then_some(line)
            };

            if let Some(fact) = fact {
                if seen.insert(fact) {
                    facts.push(fact.to_string());
                }
            }
        }
        facts
    }

    /// Facts of one passage, tagged with its source.
    pub fn facts_for(&self, passage: &ContextPassage) -> Vec<Fact> {
        self.extract(passage.content())
            .into_iter()
            .map(|content| Fact::new(passage.source(), content))
            .collect()
    }
}

/// `FactExtractor::extract` with the default rules.
pub fn extract_facts(text: &str) -> Vec<String> {
    FactExtractor::default().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bullets_are_dropped_without_falling_back() {
        // Three words after the marker: too short for a bullet, never treated as a plain line.
        assert!(extract_facts("- escrow is mandatory").is_empty());
        assert_eq!(extract_facts("•  escrow is always mandatory"), vec!["escrow is always mandatory"]);
    }

    #[test]
    fn headers_and_purpose_lines_are_not_facts() {
        let text = "## Payment schedule for all premier packages\n\
                    Purpose of this document is to explain payments\n\
                    Payments are released in five milestone stages";
        assert_eq!(extract_facts(text), vec!["Payments are released in five milestone stages"]);
    }
}
