use std::fmt;

use docqa_core::domain::Fact;
use serde::{Deserialize, Serialize};

/// Final answer. Every variant except `Refusal` carries the facts it was taken from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    /// Numeric or quantitative text copied exactly as written in the fact.
    Numeric { text: String, fact: Fact },
    /// A few facts joined verbatim.
    Facts { text: String, facts: Vec<Fact> },
    /// Model rephrasing constrained to `facts`.
    Paraphrase { text: String, facts: Vec<Fact> },
    Refusal { text: String },
}

impl Answer {
    pub fn refusal(sentence: &str) -> Self {
        Answer::Refusal {
            text: sentence.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Answer::Numeric { text, .. }
            | Answer::Facts { text, .. }
            | Answer::Paraphrase { text, .. }
            | Answer::Refusal { text } => text,
        }
    }

    pub fn is_refusal(&self) -> bool {
        matches!(self, Answer::Refusal { .. })
    }

    pub fn supporting_facts(&self) -> &[Fact] {
        match self {
            Answer::Numeric { fact, .. } => std::slice::from_ref(fact),
            Answer::Facts { facts, .. } | Answer::Paraphrase { facts, .. } => facts,
            Answer::Refusal { .. } => &[],
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
