pub mod corpus;
pub mod embeddings;
pub mod facts;
pub mod grounding;
pub mod guardrails;
pub mod index;
pub mod llm;
pub mod ollama;
pub mod pipeline;
pub mod retrieve;
