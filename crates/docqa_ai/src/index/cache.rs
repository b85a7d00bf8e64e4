use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

use docqa_core::error::{codes, AppError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CacheFile {
    model: Option<String>,
    vectors: BTreeMap<String, Vec<f32>>,
}

/// Corpus embeddings keyed by chunk id, so unchanged chunks are not re-embedded.
///
/// Chunk ids are content hashes, so a stale entry can only be reused for identical text.
/// Switching models drops every entry.
#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    path: PathBuf,
    data: CacheFile,
}

impl EmbeddingCache {
    pub fn open(dir: PathBuf) -> Result<Self, AppError> {
        let path = dir.join("embeddings.json");
        let data = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| {
                AppError::new(codes::AI_EMBEDDING_CACHE_FAILED, "Failed to read embedding cache")
                    .with_details(format!("path={}; err={}", path.display(), e))
            })?;
            match serde_json::from_slice(&bytes) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(path = %path.display(), err = %e, "embedding cache unreadable; starting empty");
                    CacheFile::default()
                }
            }
        } else {
            CacheFile::default()
        };
        Ok(Self { path, data })
    }

    pub fn len(&self) -> usize {
        self.data.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.vectors.is_empty()
    }

    pub fn get(&self, model: &str, chunk_id: &str) -> Option<&Vec<f32>> {
        if self.data.model.as_deref() != Some(model) {
            return None;
        }
        self.data.vectors.get(chunk_id)
    }

    pub fn insert(&mut self, model: &str, chunk_id: &str, vector: Vec<f32>) {
        if self.data.model.as_deref() != Some(model) {
            self.data.vectors.clear();
            self.data.model = Some(model.to_string());
        }
        self.data.vectors.insert(chunk_id.to_string(), vector);
    }

    /// Drop entries for chunks that are no longer in the corpus.
    pub fn retain_ids(&mut self, wanted: &BTreeSet<String>) {
        self.data.vectors.retain(|k, _| wanted.contains(k));
    }

    pub fn save(&self) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                AppError::new(
                    codes::AI_EMBEDDING_CACHE_FAILED,
                    "Failed to create embedding cache directory",
                )
                .with_details(format!("path={}; err={}", dir.display(), e))
            })?;
        }
        let tmp = self.path.with_extension("tmp");
        let json = serde_json::to_vec(&self.data).map_err(|e| {
            AppError::new(codes::AI_EMBEDDING_CACHE_FAILED, "Failed to encode embedding cache")
                .with_details(e.to_string())
        })?;
        fs::write(&tmp, json).map_err(|e| {
            AppError::new(codes::AI_EMBEDDING_CACHE_FAILED, "Failed to write embedding cache")
                .with_details(format!("path={}; err={}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::new(
                codes::AI_EMBEDDING_CACHE_FAILED,
                "Failed to finalize embedding cache write",
            )
            .with_details(format!("tmp={}; dest={}; err={}", tmp.display(), self.path.display(), e))
        })
    }
}
