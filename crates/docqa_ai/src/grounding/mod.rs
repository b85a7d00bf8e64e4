//! Grounding enforcement: turns retrieved passages into an answer that can be traced to them.
//!
//! The rule-based part is a fixed, ordered list of pure stages over the fact list. Each stage
//! either narrows the list or ends with an answer. Only when every stage passes does the
//! pipeline hand the surviving facts to the paraphrasing model.

use std::collections::BTreeSet;

use docqa_core::config::{DocQaConfig, GroundingConfig, Lexicon};
use docqa_core::domain::{ContextPassage, Fact};
use docqa_core::error::AppError;
use docqa_core::normalize::{content_terms, overlap_count, term_set};
use regex::Regex;

use crate::facts::FactExtractor;
use crate::guardrails::{is_verbatim_from, screen_model_output};
use crate::llm::Llm;

mod answer;
pub mod prompts;

pub use answer::Answer;
pub use prompts::build_prompt;

/// A question prepared once for every stage.
#[derive(Debug, Clone)]
pub struct Question {
    pub text: String,
    lower: String,
    keyword_terms: BTreeSet<String>,
}

impl Question {
    pub fn new(text: &str, lexicon: &Lexicon) -> Self {
        Self {
            text: text.to_string(),
            lower: text.to_lowercase(),
            keyword_terms: content_terms(text, &lexicon.keyword_stop_words),
        }
    }
}

/// Outcome of a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue(Vec<Fact>),
    Done(Answer),
}

/// Outcome of the rule-based stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grounded {
    Answered(Answer),
    /// Grounded facts (already capped) that still need phrasing by the model.
    NeedsParaphrase(Vec<Fact>),
}

type Stage = fn(&GroundingRules, &Question, Vec<Fact>) -> Step;

const STAGES: [(&str, Stage); 5] = [
    ("package_isolation", isolate_package),
    ("intent_routing", route_intent),
    ("keyword_safety", keep_keyword_facts),
    ("numeric_extraction", extract_numeric),
    ("short_answer", pass_short_answer),
];

/// The deterministic half of grounding. Pure: no I/O, no model calls.
#[derive(Debug, Clone)]
pub struct GroundingRules {
    extractor: FactExtractor,
    config: GroundingConfig,
    lexicon: Lexicon,
    numeric: Regex,
}

impl GroundingRules {
    pub fn new(config: &DocQaConfig) -> Result<Self, AppError> {
        Ok(Self {
            extractor: FactExtractor::new(config.facts.clone()),
            config: config.grounding.clone(),
            numeric: config.lexicon.compile_numeric_pattern()?,
            lexicon: config.lexicon.clone(),
        })
    }

    pub fn config(&self) -> &GroundingConfig {
        &self.config
    }

    pub fn refusal(&self) -> Answer {
        Answer::refusal(&self.config.refusal_sentence)
    }

    pub fn question(&self, text: &str) -> Question {
        Question::new(text, &self.lexicon)
    }

    /// Facts of every passage, concatenated in context order.
    pub fn collect_facts(&self, context: &[ContextPassage]) -> Vec<Fact> {
        context
            .iter()
            .flat_map(|p| self.extractor.facts_for(p))
            .collect()
    }

    pub fn ground(&self, context: &[ContextPassage], question: &str) -> Grounded {
        if context.is_empty() {
            tracing::debug!("no context passages; refusing");
            return Grounded::Answered(self.refusal());
        }

        let mut facts = self.collect_facts(context);
        if facts.is_empty() {
            tracing::debug!(passages = context.len(), "no facts in context; refusing");
            return Grounded::Answered(self.refusal());
        }

        let q = self.question(question);
        for (name, stage) in STAGES {
            match stage(self, &q, facts) {
                Step::Continue(next) => {
                    tracing::debug!(stage = name, remaining = next.len(), "stage passed");
                    facts = next;
                }
                Step::Done(answer) => {
                    debug_assert!(
                        answer.is_refusal() || is_verbatim_from(answer.text(), answer.supporting_facts())
                    );
                    tracing::debug!(stage = name, refusal = answer.is_refusal(), "stage answered");
                    return Grounded::Answered(answer);
                }
            }
        }

        facts.truncate(self.config.paraphrase_fact_limit);
        Grounded::NeedsParaphrase(facts)
    }
}

/// Restrict to facts naming the package the question names. Terminal when nothing is left.
pub fn isolate_package(rules: &GroundingRules, q: &Question, facts: Vec<Fact>) -> Step {
    let Some(package) = rules.lexicon.package_in(&q.lower) else {
        return Step::Continue(facts);
    };
    let kept = facts
        .into_iter()
        .filter(|f| f.contains_ci(&package))
        .collect::<Vec<_>>();
    if kept.is_empty() {
        return Step::Done(rules.refusal());
    }
    Step::Continue(kept)
}

/// Prefer facts mentioning the question's intent; leave the list alone if none do.
pub fn route_intent(rules: &GroundingRules, q: &Question, facts: Vec<Fact>) -> Step {
    let Some(intent) = rules.lexicon.intent_in(&q.lower) else {
        return Step::Continue(facts);
    };
    let matching = facts
        .iter()
        .filter(|f| f.contains_ci(&intent))
        .cloned()
        .collect::<Vec<_>>();
    if matching.is_empty() {
        Step::Continue(facts)
    } else {
        Step::Continue(matching)
    }
}

/// Prefer facts sharing a content term with the question; refuse only if nothing is left at all.
pub fn keep_keyword_facts(rules: &GroundingRules, q: &Question, facts: Vec<Fact>) -> Step {
    let sharing = facts
        .iter()
        .filter(|f| overlap_count(&q.keyword_terms, &term_set(&f.content)) >= 1)
        .cloned()
        .collect::<Vec<_>>();
    let facts = if sharing.is_empty() { facts } else { sharing };
    if facts.is_empty() {
        return Step::Done(rules.refusal());
    }
    Step::Continue(facts)
}

/// First non-empty numeric or currency match, verbatim.
pub fn extract_numeric(rules: &GroundingRules, _q: &Question, facts: Vec<Fact>) -> Step {
    for fact in facts.iter() {
        let found = rules
            .numeric
            .find_iter(&fact.content)
            .find(|m| !m.as_str().is_empty());
        if let Some(m) = found {
            return Step::Done(Answer::Numeric {
                text: m.as_str().to_string(),
                fact: fact.clone(),
            });
        }
    }
    Step::Continue(facts)
}

pub fn pass_short_answer(rules: &GroundingRules, _q: &Question, facts: Vec<Fact>) -> Step {
    if facts.len() > rules.config.short_answer_max_facts {
        return Step::Continue(facts);
    }
    let text = facts
        .iter()
        .map(|f| f.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Step::Done(Answer::Facts { text, facts })
}

/// Rule-based grounding plus the paraphrase fallback.
pub struct GroundingPipeline<'a> {
    rules: GroundingRules,
    llm: &'a dyn Llm,
    model: String,
}

impl<'a> GroundingPipeline<'a> {
    pub fn new(rules: GroundingRules, llm: &'a dyn Llm, model: impl Into<String>) -> Self {
        Self {
            rules,
            llm,
            model: model.into(),
        }
    }

    pub fn rules(&self) -> &GroundingRules {
        &self.rules
    }

    /// Always an answer unless the generation model itself fails.
    pub fn generate(&self, context: &[ContextPassage], question: &str) -> Result<Answer, AppError> {
        let facts = match self.rules.ground(context, question) {
            Grounded::Answered(answer) => return Ok(answer),
            Grounded::NeedsParaphrase(facts) => facts,
        };

        let prompt = build_prompt(&facts, question, &self.rules.config.refusal_sentence);
        let output = self.llm.generate(&self.model, &prompt)?;

        match screen_model_output(&output, &self.rules.config) {
            Some(text) => Ok(Answer::Paraphrase { text, facts }),
            None => {
                tracing::debug!("model output empty or not-available; refusing");
                Ok(self.rules.refusal())
            }
        }
    }
}
