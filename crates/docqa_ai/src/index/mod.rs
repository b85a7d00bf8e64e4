use std::fs;
use std::path::{Path, PathBuf};

use docqa_core::domain::{Candidate, Chunk};
use docqa_core::error::{codes, AppError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod cache;
pub mod similarity;

pub use cache::EmbeddingCache;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VectorsFile {
    dims: u32,
    vectors: Vec<Vec<f32>>,
}

/// Chunk metadata, pinned to the exact vectors file it was written with.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunksFile {
    dims: u32,
    count: u32,
    vectors_sha256: String,
    chunks: Vec<Chunk>,
}

#[derive(Debug, Clone)]
struct LoadedIndex {
    dims: usize,
    vectors: Vec<Vec<f32>>,
    chunks: Vec<Chunk>,
}

/// Exact flat inner-product index over unit-length vectors, persisted as two JSON artifacts.
///
/// `vectors.json` and `chunks.json` are each written tmp->rename, and `chunks.json` carries the
/// SHA-256 of the vectors bytes. `load` refuses any pair that disagrees, so a half-finished
/// rebuild is reported as missing rather than served.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    root: PathBuf,
    loaded: Option<LoadedIndex>,
}

impl VectorIndex {
    pub fn open(root: PathBuf) -> Self {
        Self { root, loaded: None }
    }

    fn index_dir(&self) -> PathBuf {
        self.root.join("index")
    }

    fn vectors_path(&self) -> PathBuf {
        self.index_dir().join("vectors.json")
    }

    fn chunks_path(&self) -> PathBuf {
        self.index_dir().join("chunks.json")
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn len(&self) -> usize {
        self.loaded.as_ref().map(|l| l.chunks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dims(&self) -> Option<usize> {
        self.loaded.as_ref().map(|l| l.dims)
    }

    fn ensure_dirs(&self) -> Result<(), AppError> {
        fs::create_dir_all(self.index_dir()).map_err(|e| {
            AppError::new(codes::AI_INDEX_BUILD_FAILED, "Failed to create index directory")
                .with_details(format!("path={}; err={}", self.index_dir().display(), e))
        })
    }

    /// Persist `vectors` and the position-matched `chunks`, then serve them from memory.
    pub fn build(&mut self, vectors: Vec<Vec<f32>>, chunks: Vec<Chunk>) -> Result<(), AppError> {
        if vectors.len() != chunks.len() {
            return Err(AppError::new(
                codes::AI_INDEX_BUILD_FAILED,
                "Vector and chunk counts differ",
            )
            .with_details(format!("vectors={}; chunks={}", vectors.len(), chunks.len())));
        }
        let dims = match vectors.first() {
            Some(v) if !v.is_empty() => v.len(),
            Some(_) => {
                return Err(AppError::new(
                    codes::AI_INDEX_BUILD_FAILED,
                    "Embedding vectors must not be empty",
                ))
            }
            None => {
                return Err(AppError::new(
                    codes::AI_INDEX_BUILD_FAILED,
                    "No chunks to index",
                ))
            }
        };
        for (i, v) in vectors.iter().enumerate() {
            if v.len() != dims {
                return Err(AppError::new(
                    codes::AI_INDEX_BUILD_FAILED,
                    "Embedding dimension mismatch across chunks",
                )
                .with_details(format!("expected={dims}; got={}; position={i}", v.len())));
            }
            if !v.iter().all(|x| x.is_finite()) {
                return Err(AppError::new(
                    codes::AI_INDEX_BUILD_FAILED,
                    "Embedding vector contains non-finite values",
                )
                .with_details(format!("position={i}")));
            }
        }

        self.ensure_dirs()?;

        let vectors_file = VectorsFile {
            dims: dims as u32,
            vectors,
        };
        let vectors_json = serde_json::to_vec(&vectors_file).map_err(|e| {
            AppError::new(codes::AI_INDEX_BUILD_FAILED, "Failed to encode index vectors")
                .with_details(e.to_string())
        })?;
        let chunks_file = ChunksFile {
            dims: dims as u32,
            count: chunks.len() as u32,
            vectors_sha256: hex::encode(Sha256::digest(&vectors_json)),
            chunks,
        };
        let chunks_json = serde_json::to_vec_pretty(&chunks_file).map_err(|e| {
            AppError::new(codes::AI_INDEX_BUILD_FAILED, "Failed to encode chunk metadata")
                .with_details(e.to_string())
        })?;

        // Stage both before publishing either.
        let vectors_tmp = write_tmp(&self.vectors_path(), &vectors_json)?;
        let chunks_tmp = write_tmp(&self.chunks_path(), &chunks_json)?;
        publish(&vectors_tmp, &self.vectors_path())?;
        publish(&chunks_tmp, &self.chunks_path())?;

        tracing::info!(
            chunks = chunks_file.chunks.len(),
            dims,
            path = %self.index_dir().display(),
            "vector index built"
        );

        self.loaded = Some(LoadedIndex {
            dims,
            vectors: vectors_file.vectors,
            chunks: chunks_file.chunks,
        });
        Ok(())
    }

    /// Restore the index from disk. Missing, undecodable or mismatched artifacts are all `AI_INDEX_NOT_FOUND`.
    pub fn load(&mut self) -> Result<(), AppError> {
        let vectors_path = self.vectors_path();
        let chunks_path = self.chunks_path();

        let vectors_bytes = read_artifact(&vectors_path)?;
        let chunks_bytes = read_artifact(&chunks_path)?;

        let vectors_file: VectorsFile = serde_json::from_slice(&vectors_bytes).map_err(|e| {
            not_found("Index vectors are corrupt")
                .with_details(format!("path={}; err={}", vectors_path.display(), e))
        })?;
        let chunks_file: ChunksFile = serde_json::from_slice(&chunks_bytes).map_err(|e| {
            not_found("Chunk metadata is corrupt")
                .with_details(format!("path={}; err={}", chunks_path.display(), e))
        })?;

        let vectors_sha256 = hex::encode(Sha256::digest(&vectors_bytes));
        if vectors_sha256 != chunks_file.vectors_sha256 {
            return Err(not_found("Index artifacts are out of sync; rebuild the index")
                .with_details(format!(
                    "expected_sha256={}; actual_sha256={}",
                    chunks_file.vectors_sha256, vectors_sha256
                )));
        }

        let dims = vectors_file.dims as usize;
        let consistent = dims > 0
            && chunks_file.dims == vectors_file.dims
            && chunks_file.count as usize == chunks_file.chunks.len()
            && vectors_file.vectors.len() == chunks_file.chunks.len()
            && vectors_file.vectors.iter().all(|v| v.len() == dims);
        if !consistent {
            return Err(not_found("Index artifacts disagree on shape; rebuild the index")
                .with_details(format!(
                    "dims={}; vectors={}; chunks={}",
                    dims,
                    vectors_file.vectors.len(),
                    chunks_file.chunks.len()
                )));
        }

        tracing::info!(chunks = chunks_file.chunks.len(), dims, "vector index loaded");
        self.loaded = Some(LoadedIndex {
            dims,
            vectors: vectors_file.vectors,
            chunks: chunks_file.chunks,
        });
        Ok(())
    }

    /// Up to `top_k` chunks by descending inner product with `query`.
    ///
    /// Equal scores keep stored order; callers should not depend on tie order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Candidate>, AppError> {
        let loaded = self.loaded.as_ref().ok_or_else(|| {
            AppError::new(
                codes::AI_INDEX_NOT_READY,
                "Index not ready; build or load the index before searching",
            )
        })?;
        if query.len() != loaded.dims {
            return Err(AppError::new(
                codes::AI_RETRIEVAL_FAILED,
                "Query embedding dims do not match index dims",
            )
            .with_details(format!("index_dims={}; query_dims={}", loaded.dims, query.len())));
        }
        if !query.iter().all(|x| x.is_finite()) {
            return Err(AppError::new(
                codes::AI_RETRIEVAL_FAILED,
                "Query embedding contains non-finite values",
            ));
        }
        let top_k = top_k.max(1);

        let mut hits: Vec<(usize, f32)> = loaded
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, similarity::inner_product(query, v)))
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        hits.truncate(top_k);

        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(rank, (i, score))| Candidate {
                chunk: loaded.chunks[i].clone(),
                rank,
                score,
            })
            .collect())
    }
}

fn not_found(message: &str) -> AppError {
    AppError::new(codes::AI_INDEX_NOT_FOUND, message)
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, AppError> {
    fs::read(path).map_err(|e| {
        not_found("Index artifact missing; build the index first")
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}

fn write_tmp(dest: &Path, bytes: &[u8]) -> Result<PathBuf, AppError> {
    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, bytes).map_err(|e| {
        AppError::new(codes::AI_INDEX_BUILD_FAILED, "Failed to write index artifact")
            .with_details(format!("path={}; err={}", tmp.display(), e))
    })?;
    Ok(tmp)
}

fn publish(tmp: &Path, dest: &Path) -> Result<(), AppError> {
    fs::rename(tmp, dest).map_err(|e| {
        AppError::new(codes::AI_INDEX_BUILD_FAILED, "Failed to finalize index artifact write")
            .with_details(format!("tmp={}; dest={}; err={}", tmp.display(), dest.display(), e))
    })
}
