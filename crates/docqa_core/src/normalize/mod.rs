pub mod terms;

pub use terms::{content_terms, overlap_count, term_set, word_count};
