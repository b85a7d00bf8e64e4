use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{codes, AppError};

mod lexicon;

pub use lexicon::{IntentRule, Lexicon, DEFAULT_NUMERIC_PATTERN};

pub const REFUSAL_SENTENCE: &str = "This information is not available in the provided documents.";

/// Everything the retrieval and grounding stages read. Loaded once at startup and never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DocQaConfig {
    pub retrieval: RetrievalConfig,
    pub facts: FactRules,
    pub grounding: GroundingConfig,
    pub lexicon: Lexicon,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates requested from the vector index.
    pub top_k: usize,
    /// Context passages kept after the overlap gate.
    pub max_passages: usize,
    /// Question terms a candidate must share to survive.
    pub min_term_overlap: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_passages: 2,
            min_term_overlap: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FactRules {
    pub bullet_markers: Vec<char>,
    pub bullet_min_words: usize,
    pub line_min_words: usize,
    /// Non-bullet lines starting with these (case-insensitive) are never facts.
    pub excluded_prefixes: Vec<String>,
}

impl Default for FactRules {
    fn default() -> Self {
        Self {
            bullet_markers: vec!['-', '•'],
            bullet_min_words: 4,
            line_min_words: 6,
            excluded_prefixes: vec!["#".to_string(), "purpose".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GroundingConfig {
    /// Fact lists at or under this size are returned verbatim.
    pub short_answer_max_facts: usize,
    /// Facts handed to the paraphrasing model.
    pub paraphrase_fact_limit: usize,
    pub refusal_sentence: String,
    /// Model output containing this (case-insensitive) becomes a refusal.
    pub not_available_marker: String,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            short_answer_max_facts: 3,
            paraphrase_fact_limit: 3,
            refusal_sentence: REFUSAL_SENTENCE.to_string(),
            not_available_marker: "not available".to_string(),
        }
    }
}

impl DocQaConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::new(codes::CONFIG_READ_FAILED, "Failed to read config file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        let cfg: DocQaConfig = serde_json::from_str(&raw).map_err(|e| {
            AppError::new(codes::CONFIG_INVALID, "Failed to decode config file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        cfg.validate()?;
        tracing::info!(path = %path.display(), "loaded docqa config");
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let zeroes = [
            ("retrieval.top_k", self.retrieval.top_k),
            ("retrieval.max_passages", self.retrieval.max_passages),
            ("grounding.paraphrase_fact_limit", self.grounding.paraphrase_fact_limit),
            ("facts.bullet_min_words", self.facts.bullet_min_words),
            ("facts.line_min_words", self.facts.line_min_words),
        ];
        for (field, value) in zeroes {
            if value == 0 {
                return Err(AppError::new(codes::CONFIG_INVALID, "Config value must be positive")
                    .with_details(format!("field={field}")));
            }
        }
        if self.facts.bullet_markers.is_empty() {
            return Err(AppError::new(
                codes::CONFIG_INVALID,
                "At least one bullet marker is required",
            ));
        }
        if self.grounding.refusal_sentence.trim().is_empty() {
            return Err(AppError::new(
                codes::CONFIG_INVALID,
                "Refusal sentence must not be empty",
            ));
        }
        if self.lexicon.compile_numeric_pattern()?.is_match("") {
            return Err(AppError::new(
                codes::CONFIG_INVALID,
                "Numeric pattern must not match empty text",
            )
            .with_details(format!("pattern={}", self.lexicon.numeric_pattern)));
        }
        Ok(())
    }
}

impl Lexicon {
    pub fn compile_numeric_pattern(&self) -> Result<Regex, AppError> {
        RegexBuilder::new(&self.numeric_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                AppError::new(codes::CONFIG_INVALID, "Numeric pattern is not a valid regex")
                    .with_details(e.to_string())
            })
    }
}
