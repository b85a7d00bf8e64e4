use docqa_core::domain::ContextPassage;
use docqa_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::grounding::{Answer, GroundingPipeline};
use crate::retrieve::Retriever;

/// The answer together with the passages it was grounded on, for display as evidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaResponse {
    pub context: Vec<ContextPassage>,
    pub answer: Answer,
}

pub struct AnswerPipeline<'a> {
    retriever: Retriever<'a>,
    grounding: GroundingPipeline<'a>,
}

impl<'a> AnswerPipeline<'a> {
    pub fn new(retriever: Retriever<'a>, grounding: GroundingPipeline<'a>) -> Self {
        Self {
            retriever,
            grounding,
        }
    }

    pub fn answer(&self, question: &str) -> Result<QaResponse, AppError> {
        let context = self.retriever.retrieve(question)?;
        let answer = self.grounding.generate(&context, question)?;
        tracing::info!(
            passages = context.len(),
            refusal = answer.is_refusal(),
            "question answered"
        );
        Ok(QaResponse { context, answer })
    }
}
