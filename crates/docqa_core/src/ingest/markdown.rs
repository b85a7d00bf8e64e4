use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::SourceDocument;
use crate::error::{codes, AppError};
use crate::normalize::word_count;

lazy_static! {
    // Level 1-3 header starting a line after the first.
    static ref HEADER_REGEX: Regex = Regex::new(r"\n#{1,3} .+").expect("header pattern compiles");
}

/// Chunks shorter than this are dropped; small policy documents rarely need less.
pub const DEFAULT_MIN_CHUNK_WORDS: usize = 40;

/// Load every file in `dir` whose extension is in `allowed_exts`, in file-name order.
///
/// Empty files are skipped with a warning. Loading nothing at all is an error.
pub fn load_documents(dir: &Path, allowed_exts: &[&str]) -> Result<Vec<SourceDocument>, AppError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        AppError::new(codes::INGEST_READ_FAILED, "Failed to read document directory")
            .with_details(format!("path={}; err={}", dir.display(), e))
    })?;

    let mut paths = entries
        .flatten()
        .map(|ent| ent.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .map(|ext| allowed_exts.iter().any(|a| a.eq_ignore_ascii_case(ext)))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();
    paths.sort();

    let mut docs = Vec::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = fs::read_to_string(&path).map_err(|e| {
            AppError::new(codes::INGEST_READ_FAILED, "Failed to read document")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        let text = text.trim();
        if text.is_empty() {
            tracing::warn!(source = %name, "empty document skipped");
            continue;
        }
        tracing::debug!(source = %name, "loaded document");
        docs.push(SourceDocument {
            source: name,
            text: text.to_string(),
        });
    }

    if docs.is_empty() {
        return Err(AppError::new(codes::INGEST_NO_DOCUMENTS, "No valid documents loaded")
            .with_details(format!("path={}", dir.display())));
    }
    Ok(docs)
}

/// Split markdown on level 1-3 headers, keeping each header with the body that follows it.
///
/// A header only splits when it starts a line after the first; leading text before the
/// first header stays with it. Chunks under `min_words` words are dropped.
pub fn chunk_markdown(text: &str, min_words: usize) -> Vec<String> {
    let mut parts: Vec<&str> = Vec::new();
    let mut last = 0usize;
    for m in HEADER_REGEX.find_iter(text) {
        parts.push(&text[last..m.start()]);
        parts.push(m.as_str());
        last = m.end();
    }
    parts.push(&text[last..]);

    let mut chunks = Vec::new();
    let mut current = String::new();
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if part.starts_with('#') {
            if word_count(&current) >= min_words {
                chunks.push(current.trim().to_string());
            }
            current = part.to_string();
        } else {
            current.push('\n');
            current.push_str(part);
        }
    }
    if word_count(&current) >= min_words {
        chunks.push(current.trim().to_string());
    }

    tracing::debug!(chunks = chunks.len(), "markdown chunks created");
    chunks
}
