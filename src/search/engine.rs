//! Hybrid search engine
//!
//! Orchestrates the keyword scorer and the embedding backend over the full
//! record set. Degraded behavior is deliberate and layered: a model that
//! never loads means keyword-only search for the process lifetime, a failed
//! query embedding means keyword-only for that one call, and a record that
//! failed to embed simply never participates in semantic scoring.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::knowledge::FaqRecord;

use super::embedding::{combined_text, cosine_similarity, EmbedError, Embedder, TextEmbedder};
use super::keyword;
use super::types::{MatchType, SearchConfig, SearchResult, SearchStats};

/// Hybrid search over the FAQ knowledge base.
///
/// Construct, call [`initialize`](Self::initialize) once with the full
/// record set, then share behind an `Arc`. After initialization the engine
/// is read-only and `search` is safe to call concurrently.
pub struct HybridSearchEngine {
    config: SearchConfig,
    embedder: Option<Arc<dyn Embedder>>,
    records: Vec<FaqRecord>,
    /// Record id to cached embedding, written once during initialization
    vectors: HashMap<String, Vec<f32>>,
    initialized: bool,
}

impl HybridSearchEngine {
    /// Create a keyword-only engine (no embedding model required).
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            embedder: None,
            records: Vec::new(),
            vectors: HashMap::new(),
            initialized: false,
        }
    }

    /// Create an engine with an injected embedding backend.
    pub fn with_embedder(config: SearchConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder: Some(embedder),
            ..Self::new(config)
        }
    }

    /// Create an engine backed by the bundled local model, falling back to
    /// keyword-only search if the model cannot be loaded. The fallback is
    /// permanent for this process; there is no retry.
    pub async fn with_default_model(config: SearchConfig) -> Self {
        match task::spawn_blocking(TextEmbedder::load).await {
            Ok(Ok(embedder)) => {
                info!(
                    "embedding model loaded ({} dimensions)",
                    embedder.dimension()
                );
                Self::with_embedder(config, Arc::new(embedder))
            }
            Ok(Err(err)) => {
                warn!("embedding model unavailable, using keyword-only search: {err}");
                Self::new(config)
            }
            Err(err) => {
                warn!("embedding model load task failed, using keyword-only search: {err}");
                Self::new(config)
            }
        }
    }

    /// Whether semantic scoring is available at all.
    pub fn is_semantic(&self) -> bool {
        self.embedder.is_some()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Snapshot the record set and build the per-record embedding cache.
    ///
    /// Idempotent: calls after the first successful one are no-ops. A record
    /// whose embedding fails is logged and skipped; it stays searchable by
    /// keyword. Records added to the knowledge base after this call are not
    /// visible to search until the process restarts and re-initializes.
    pub async fn initialize(&mut self, records: Vec<FaqRecord>) {
        if self.initialized {
            return;
        }

        if let Some(embedder) = self.embedder.clone() {
            info!("generating embeddings for {} FAQ records", records.len());

            for record in &records {
                let text = combined_text(record);
                let backend = embedder.clone();
                match task::spawn_blocking(move || backend.embed(&text)).await {
                    Ok(Ok(vector)) => {
                        self.vectors.insert(record.id.clone(), vector);
                    }
                    Ok(Err(err)) => {
                        warn!("failed to embed record {}: {err}", record.id);
                    }
                    Err(err) => {
                        warn!("embedding task for record {} failed: {err}", record.id);
                    }
                }
            }

            info!(
                "embedded {}/{} FAQ records",
                self.vectors.len(),
                records.len()
            );
        }

        self.records = records;
        self.initialized = true;
    }

    /// Search the knowledge base. Never fails: an empty or unmatched query
    /// yields an empty list, and any embedding trouble degrades to
    /// keyword-only results for this call.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let mut keyword_results = keyword::search(query, &self.records);

        let Some(embedder) = self.embedder.clone() else {
            keyword_results.truncate(limit);
            return keyword_results;
        };

        let query_vector = match self.embed_query(embedder, query).await {
            Ok(vector) => vector,
            Err(err) => {
                warn!("query embedding failed, keyword-only for this call: {err}");
                keyword_results.truncate(limit);
                return keyword_results;
            }
        };

        // Semantic pass over the cached vectors, in record insertion order.
        let mut merged: Vec<SearchResult> = Vec::new();
        let mut semantic_index: HashMap<&str, usize> = HashMap::new();

        for record in &self.records {
            let Some(vector) = self.vectors.get(&record.id) else {
                continue;
            };
            let similarity = cosine_similarity(&query_vector, vector);
            if similarity > self.config.similarity_threshold {
                semantic_index.insert(record.id.as_str(), merged.len());
                merged.push(SearchResult {
                    record: record.clone(),
                    score: similarity * self.config.semantic_scale,
                    similarity,
                    match_type: MatchType::Semantic,
                });
            }
        }

        let semantic_count = merged.len();
        let keyword_count = keyword_results.len();

        // Merge: a record matched by both signals gets a boost proportional
        // to its similarity, on top of the stronger of the two scores.
        for result in keyword_results {
            match semantic_index.get(result.record.id.as_str()) {
                Some(&i) => {
                    let entry = &mut merged[i];
                    entry.score =
                        entry.score.max(result.score) + entry.similarity * self.config.hybrid_bonus_scale;
                    entry.match_type = MatchType::Hybrid;
                }
                None => merged.push(result),
            }
        }

        merged.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(limit);

        debug!(
            "hybrid search returned {} results ({} semantic, {} keyword)",
            merged.len(),
            semantic_count,
            keyword_count
        );

        merged
    }

    async fn embed_query(
        &self,
        embedder: Arc<dyn Embedder>,
        query: &str,
    ) -> Result<Vec<f32>, EmbedError> {
        let text = query.to_string();
        let embed_task = task::spawn_blocking(move || embedder.embed(&text));

        match timeout(self.config.embed_timeout, embed_task).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => Err(EmbedError(format!("embedding task failed: {err}"))),
            Err(_) => Err(EmbedError(format!(
                "embedding timed out after {:?}",
                self.config.embed_timeout
            ))),
        }
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            total_items: self.records.len(),
            embedded_items: self.vectors.len(),
            is_initialized: self.initialized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{KnowledgeBase, NewFaqRecord};

    fn sample_base() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.add(NewFaqRecord {
            question: "How do I enable GST in TallyPrime?".to_string(),
            answer: "Enable GST in company features (F11).".to_string(),
            category: "Taxation & Compliance".to_string(),
            keywords: vec!["GST".to_string(), "enable".to_string()],
            steps: None,
        })
        .unwrap();
        kb
    }

    #[tokio::test]
    async fn test_stats_before_and_after_initialize() {
        let kb = sample_base();
        let mut engine = HybridSearchEngine::new(SearchConfig::default());

        let stats = engine.stats();
        assert!(!stats.is_initialized);
        assert_eq!(stats.total_items, 0);

        engine.initialize(kb.load_all().to_vec()).await;

        let stats = engine.stats();
        assert!(stats.is_initialized);
        assert_eq!(stats.total_items, 1);
        assert_eq!(stats.embedded_items, 0); // keyword-only engine
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let kb = sample_base();
        let mut engine = HybridSearchEngine::new(SearchConfig::default());

        engine.initialize(kb.load_all().to_vec()).await;
        engine.initialize(Vec::new()).await; // no-op, records kept

        assert_eq!(engine.stats().total_items, 1);
    }

    #[tokio::test]
    async fn test_empty_query_returns_nothing() {
        let kb = sample_base();
        let mut engine = HybridSearchEngine::new(SearchConfig::default());
        engine.initialize(kb.load_all().to_vec()).await;

        assert!(engine.search("", 10).await.is_empty());
        assert!(engine.search("   ", 10).await.is_empty());
    }
}
