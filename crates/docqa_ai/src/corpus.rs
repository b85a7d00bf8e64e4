use std::collections::BTreeSet;

use docqa_core::domain::{Chunk, SourceDocument};
use docqa_core::error::AppError;
use docqa_core::ingest::markdown::chunk_markdown;

use crate::embeddings::Embedder;
use crate::index::{similarity, EmbeddingCache};

/// Chunk every document and embed each chunk, reusing cached vectors for unchanged chunks.
///
/// Returns unit-length vectors and the position-matched chunks, ready for `VectorIndex::build`.
/// The cache is pruned to the current corpus and saved only after every embedding succeeded.
pub fn ingest_and_embed(
    docs: &[SourceDocument],
    embedder: &dyn Embedder,
    model: &str,
    min_chunk_words: usize,
    cache: &mut EmbeddingCache,
) -> Result<(Vec<Vec<f32>>, Vec<Chunk>), AppError> {
    let mut chunks = Vec::new();
    for doc in docs {
        let before = chunks.len();
        for content in chunk_markdown(&doc.text, min_chunk_words) {
            chunks.push(Chunk::new(doc.source.clone(), content));
        }
        tracing::debug!(source = %doc.source, chunks = chunks.len() - before, "document chunked");
    }

    let mut vectors = Vec::with_capacity(chunks.len());
    let mut embedded = 0usize;
    for chunk in chunks.iter() {
        let v = match cache.get(model, &chunk.id) {
            Some(v) => v.clone(),
            None => {
                // Keep the embedder's code and retryable flag.
                let v = embedder.embed(model, &chunk.content).map_err(|e| {
                    let at = format!("source={}; chunk_id={}", chunk.source, chunk.id);
                    let details = match e.details.as_deref() {
                        Some(d) => format!("{at}; {d}"),
                        None => at,
                    };
                    e.with_details(details)
                })?;
                let v = similarity::normalize(v);
                cache.insert(model, &chunk.id, v.clone());
                embedded += 1;
                v
            }
        };
        vectors.push(v);
    }

    let wanted = chunks.iter().map(|c| c.id.clone()).collect::<BTreeSet<_>>();
    cache.retain_ids(&wanted);
    cache.save()?;

    tracing::info!(
        chunks = chunks.len(),
        embedded,
        cached = chunks.len() - embedded,
        "corpus embedded"
    );
    Ok((vectors, chunks))
}
