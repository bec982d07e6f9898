//! FAQ knowledge base
//!
//! Holds the authoritative set of FAQ records in memory. Records are
//! bulk-loaded from the bundled dataset at startup and never mutated or
//! deleted afterwards; the store contract still permits insertion.

mod seed;

pub use seed::builtin_records;

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// One step of a procedural answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqStep {
    /// Step number, starting at 1
    pub step: u32,
    pub description: String,
}

/// A single question/answer knowledge unit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqRecord {
    /// Unique identifier, assigned at insert
    pub id: String,
    pub question: String,
    pub answer: String,
    /// Coarse topical tag, not a controlled taxonomy
    pub category: String,
    /// Author-curated match boosters
    pub keywords: Vec<String>,
    /// Optional procedural steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<FaqStep>>,
    pub created_at: DateTime<Utc>,
}

/// An FAQ record as authored, before the store assigns id and timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFaqRecord {
    pub question: String,
    pub answer: String,
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub steps: Option<Vec<FaqStep>>,
}

/// Rejected insert: the record is missing required content
#[derive(Debug, Error)]
#[error("invalid FAQ record: {reason}")]
pub struct InvalidRecord {
    pub reason: String,
}

impl InvalidRecord {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// In-memory FAQ store: an owned record arena plus an id index.
///
/// Append-only. Insertion order is preserved and is the order `load_all`
/// returns; search relies on it for deterministic tie-breaking.
pub struct KnowledgeBase {
    records: Vec<FaqRecord>,
    index: HashMap<String, usize>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a store pre-loaded with the bundled TallyPrime dataset.
    pub fn with_builtin() -> Result<Self> {
        let mut kb = Self::new();
        for record in builtin_records()? {
            kb.add(record)
                .context("bundled FAQ dataset contains an invalid record")?;
        }
        info!("loaded {} FAQ records", kb.len());
        Ok(kb)
    }

    /// Insert a record, assigning a fresh id and creation timestamp.
    pub fn add(&mut self, new: NewFaqRecord) -> Result<FaqRecord, InvalidRecord> {
        if new.question.trim().is_empty() {
            return Err(InvalidRecord::new("question must not be empty"));
        }
        if new.answer.trim().is_empty() {
            return Err(InvalidRecord::new("answer must not be empty"));
        }

        let record = FaqRecord {
            id: uuid::Uuid::new_v4().to_string(),
            question: new.question,
            answer: new.answer,
            category: new.category,
            keywords: new.keywords,
            steps: new.steps,
            created_at: Utc::now(),
        };

        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record.clone());
        Ok(record)
    }

    /// All records, insertion order preserved.
    pub fn load_all(&self) -> &[FaqRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&FaqRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewFaqRecord {
        NewFaqRecord {
            question: "How do I enable GST in TallyPrime?".to_string(),
            answer: "Enable GST in company features (F11).".to_string(),
            category: "Taxation & Compliance".to_string(),
            keywords: vec!["GST".to_string(), "enable".to_string()],
            steps: None,
        }
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut kb = KnowledgeBase::new();
        let a = kb.add(sample()).unwrap();
        let b = kb.add(sample()).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.get(&a.id).unwrap().id, a.id);
    }

    #[test]
    fn test_add_rejects_empty_question() {
        let mut kb = KnowledgeBase::new();
        let mut record = sample();
        record.question = "   ".to_string();

        let err = kb.add(record).unwrap_err();
        assert!(err.to_string().contains("question"));
        assert!(kb.is_empty());
    }

    #[test]
    fn test_add_rejects_empty_answer() {
        let mut kb = KnowledgeBase::new();
        let mut record = sample();
        record.answer = String::new();

        assert!(kb.add(record).is_err());
    }

    #[test]
    fn test_load_all_preserves_insertion_order() {
        let mut kb = KnowledgeBase::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            let mut record = sample();
            record.question = format!("Question number {}?", i);
            ids.push(kb.add(record).unwrap().id);
        }

        let stored: Vec<_> = kb.load_all().iter().map(|r| r.id.clone()).collect();
        assert_eq!(stored, ids);
    }
}
