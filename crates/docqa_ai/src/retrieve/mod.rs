use docqa_core::config::{Lexicon, RetrievalConfig};
use docqa_core::domain::ContextPassage;
use docqa_core::error::AppError;
use docqa_core::normalize::{content_terms, overlap_count, term_set};

use crate::embeddings::Embedder;
use crate::index::{similarity, VectorIndex};

/// Similarity search followed by a lexical-overlap gate.
///
/// Holds no state of its own between calls; it only borrows the loaded index and the embedder.
pub struct Retriever<'a> {
    index: &'a VectorIndex,
    embedder: &'a dyn Embedder,
    model: String,
    config: RetrievalConfig,
    stop_words: Vec<String>,
}

impl<'a> Retriever<'a> {
    pub fn new(
        index: &'a VectorIndex,
        embedder: &'a dyn Embedder,
        model: impl Into<String>,
        config: RetrievalConfig,
        lexicon: &Lexicon,
    ) -> Self {
        Self {
            index,
            embedder,
            model: model.into(),
            config,
            stop_words: lexicon.retrieval_stop_words.clone(),
        }
    }

    /// At most `max_passages` passages, in similarity order, each sharing at least
    /// `min_term_overlap` question terms. Never padded.
    pub fn retrieve(&self, question: &str) -> Result<Vec<ContextPassage>, AppError> {
        let query = similarity::normalize(self.embedder.embed(&self.model, question)?);
        let candidates = self.index.search(&query, self.config.top_k)?;

        let question_terms = content_terms(question, &self.stop_words);

        let mut passages = Vec::new();
        for c in candidates {
            let shared = overlap_count(&question_terms, &term_set(&c.chunk.content));
            if shared < self.config.min_term_overlap {
                tracing::debug!(
                    source = %c.chunk.source,
                    rank = c.rank,
                    shared,
                    "candidate rejected by overlap gate"
                );
                continue;
            }
            passages.push(ContextPassage::from(c));
            if passages.len() == self.config.max_passages {
                break;
            }
        }

        tracing::debug!(passages = passages.len(), "retrieval finished");
        Ok(passages)
    }
}
