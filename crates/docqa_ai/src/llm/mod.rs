use docqa_core::error::AppError;

/// Prompt to text. Implementations decode deterministically and bound their output.
///
/// An empty completion is `Ok("")`; only an unusable model is an `Err`.
pub trait Llm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError>;
}

pub mod ollama_llm;
