use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A unit of indexed text. Immutable once ingested; the vector index owns the persisted list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Hex SHA-256 of the source and content; stable across runs.
    pub id: String,
    pub source: String,
    pub content: String,
}

impl Chunk {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        let source = source.into();
        let content = content.into();
        let id = chunk_id(&source, &content);
        Self { id, source, content }
    }
}

pub fn chunk_id(source: &str, content: &str) -> String {
    let payload = format!("source={source}\ncontent={content}");
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// A chunk proposed by similarity search, before the lexical-overlap gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub chunk: Chunk,
    /// 0-based position in the similarity ranking.
    pub rank: usize,
    pub score: f32,
}

/// A candidate that survived the lexical-overlap relevance filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextPassage {
    pub chunk: Chunk,
    pub rank: usize,
    pub score: f32,
}

impl ContextPassage {
    pub fn source(&self) -> &str {
        &self.chunk.source
    }

    pub fn content(&self) -> &str {
        &self.chunk.content
    }
}

impl From<Candidate> for ContextPassage {
    fn from(c: Candidate) -> Self {
        Self {
            chunk: c.chunk,
            rank: c.rank,
            score: c.score,
        }
    }
}

/// One atomic factual line, tagged with the passage source it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fact {
    pub source: String,
    pub content: String,
}

impl Fact {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }

    pub fn contains_ci(&self, needle_lower: &str) -> bool {
        self.content.to_lowercase().contains(needle_lower)
    }
}

/// A loaded document before chunking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDocument {
    pub source: String,
    pub text: String,
}
