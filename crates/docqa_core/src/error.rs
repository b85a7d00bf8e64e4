use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape shared by the core, the AI layer and the CLI.
///
/// `code` is a stable `SCREAMING_SNAKE` identifier grouped by prefix
/// (`CONFIG_*`, `INGEST_*`, `AI_INDEX_*`, `AI_MODEL_*`, ...). Grounding
/// insufficiency is never an error; it resolves to a refusal answer instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// True when the error came from the generation or embedding model being unreachable.
    pub fn is_model_unavailable(&self) -> bool {
        self.code == codes::AI_MODEL_UNAVAILABLE
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = self.details.as_deref() {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

pub mod codes {
    pub const CONFIG_READ_FAILED: &str = "CONFIG_READ_FAILED";
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    pub const INGEST_READ_FAILED: &str = "INGEST_READ_FAILED";
    pub const INGEST_NO_DOCUMENTS: &str = "INGEST_NO_DOCUMENTS";

    pub const AI_INDEX_BUILD_FAILED: &str = "AI_INDEX_BUILD_FAILED";
    pub const AI_INDEX_NOT_FOUND: &str = "AI_INDEX_NOT_FOUND";
    pub const AI_INDEX_NOT_READY: &str = "AI_INDEX_NOT_READY";
    pub const AI_RETRIEVAL_FAILED: &str = "AI_RETRIEVAL_FAILED";

    pub const AI_EMBEDDINGS_FAILED: &str = "AI_EMBEDDINGS_FAILED";
    pub const AI_EMBEDDING_CACHE_FAILED: &str = "AI_EMBEDDING_CACHE_FAILED";

    pub const AI_REMOTE_NOT_ALLOWED: &str = "AI_REMOTE_NOT_ALLOWED";
    pub const AI_MODEL_UNAVAILABLE: &str = "AI_MODEL_UNAVAILABLE";
    pub const AI_MODEL_UNHEALTHY: &str = "AI_MODEL_UNHEALTHY";
    pub const AI_GENERATION_FAILED: &str = "AI_GENERATION_FAILED";

    pub const CLI_OUTPUT_FAILED: &str = "CLI_OUTPUT_FAILED";
}
