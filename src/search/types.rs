//! Common types for the search module

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::knowledge::FaqRecord;

/// Which signal(s) produced a search result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Keyword,
    Semantic,
    Hybrid,
}

/// One ranked hit. Constructed fresh per search call, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub record: FaqRecord,
    pub score: f32,
    /// Cosine similarity against the query; 0.0 when not semantically matched
    pub similarity: f32,
    pub match_type: MatchType,
}

/// Engine introspection for health and diagnostics
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub total_items: usize,
    pub embedded_items: usize,
    pub is_initialized: bool,
}

/// Tuning knobs for the hybrid engine
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Similarities at or below this value are not semantic matches
    pub similarity_threshold: f32,
    /// Places similarities on the same numeric range as keyword scores
    pub semantic_scale: f32,
    /// Multiplier for the similarity bonus applied when both signals agree
    pub hybrid_bonus_scale: f32,
    /// Result count when the caller does not specify one
    pub default_limit: usize,
    /// Time allowed for a single query embedding call
    pub embed_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            semantic_scale: 10.0,
            hybrid_bonus_scale: 5.0,
            default_limit: 10,
            embed_timeout: Duration::from_secs(10),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.similarity_threshold, 0.3);
        assert_eq!(config.semantic_scale, 10.0);
        assert_eq!(config.hybrid_bonus_scale, 5.0);
        assert_eq!(config.default_limit, 10);
    }

    #[test]
    fn test_config_builders() {
        let config = SearchConfig::new()
            .with_similarity_threshold(0.5)
            .with_default_limit(3)
            .with_embed_timeout(Duration::from_secs(2));

        assert_eq!(config.similarity_threshold, 0.5);
        assert_eq!(config.default_limit, 3);
        assert_eq!(config.embed_timeout, Duration::from_secs(2));
    }
}
