use serde::{Deserialize, Serialize};

/// Keyword tables that drive retrieval filtering and grounding.
///
/// These are corpus-specific. The defaults describe the construction-services
/// policy corpus the system was first tuned on; swap them per domain via the
/// config file rather than editing the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Lexicon {
    /// Removed from the question before the retrieval overlap gate.
    pub retrieval_stop_words: Vec<String>,
    /// Removed from the question before the keyword safety filter.
    pub keyword_stop_words: Vec<String>,
    /// Product/package names; checked in order, first hit wins.
    pub packages: Vec<String>,
    /// Keyword to canonical intent, checked in order, first hit wins.
    pub intents: Vec<IntentRule>,
    /// Matched case-insensitively against facts; the first match is returned verbatim.
    pub numeric_pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntentRule {
    pub keyword: String,
    pub intent: String,
}

impl IntentRule {
    pub fn new(keyword: &str, intent: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            intent: intent.to_string(),
        }
    }
}

pub const DEFAULT_NUMERIC_PATTERN: &str = r"(₹\s?[\d,]+|\d{1,3},\d{3}\s*/\s*\w+|\d+\s*/\s*\w+)";

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        let retrieval = [
            "what", "how", "does", "do", "is", "are", "the", "a", "an", "and", "or", "to", "of",
            "during", "when", "that",
        ];
        let mut keyword = retrieval.to_vec();
        keyword.extend(["which", "use"]);

        Self {
            retrieval_stop_words: words(&retrieval),
            keyword_stop_words: words(&keyword),
            packages: words(&["essential", "premier", "infinia", "pinnacle"]),
            intents: vec![
                IntentRule::new("delay", "delay"),
                IntentRule::new("delays", "delay"),
                IntentRule::new("escrow", "escrow"),
                IntentRule::new("payment", "payment"),
                IntentRule::new("payments", "payment"),
                IntentRule::new("maintenance", "maintenance"),
                IntentRule::new("wallet", "wallet"),
                IntentRule::new("price", "price"),
                IntentRule::new("steel", "steel"),
                IntentRule::new("quality", "quality"),
                IntentRule::new("checkpoint", "quality"),
                IntentRule::new("transparency", "transparency"),
                IntentRule::new("visibility", "visibility"),
            ],
            numeric_pattern: DEFAULT_NUMERIC_PATTERN.to_string(),
        }
    }
}

impl Lexicon {
    /// First configured package named in the (already lower-cased) question.
    pub fn package_in(&self, question_lower: &str) -> Option<String> {
        self.packages
            .iter()
            .map(|p| p.to_lowercase())
            .find(|p| !p.is_empty() && question_lower.contains(p.as_str()))
    }

    /// Canonical intent for the first keyword found in the (already lower-cased) question.
    pub fn intent_in(&self, question_lower: &str) -> Option<String> {
        self.intents
            .iter()
            .find(|r| !r.keyword.is_empty() && question_lower.contains(&r.keyword.to_lowercase()))
            .map(|r| r.intent.to_lowercase())
    }
}
