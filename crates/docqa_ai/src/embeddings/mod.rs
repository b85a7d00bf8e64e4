use docqa_core::error::AppError;

/// Text to dense vector. The same model must embed the corpus and the questions.
pub trait Embedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError>;
}

pub mod ollama_embed;
