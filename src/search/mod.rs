//! Hybrid FAQ search
//!
//! Keyword scoring always runs; semantic similarity is blended in when the
//! embedding model is available, and the engine degrades to keyword-only
//! search when it is not.

pub mod embedding;
pub mod engine;
pub mod keyword;
pub mod types;

pub use embedding::{cosine_similarity, EmbedError, Embedder, InitError, TextEmbedder};
pub use engine::HybridSearchEngine;
pub use types::{MatchType, SearchConfig, SearchResult, SearchStats};
