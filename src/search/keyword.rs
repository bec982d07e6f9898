//! Weighted keyword scoring
//!
//! A deterministic substring heuristic: no tokenization, no index. Each
//! check contributes a fixed weight and the checks are independent, so the
//! same (query, record) pair always scores the same.

use crate::knowledge::FaqRecord;

use super::types::{MatchType, SearchResult};

/// Terms common across the TallyPrime domain. A query mentioning any of
/// these earns a flat bonus on every record, biasing all results uniformly
/// toward domain vocabulary.
pub const TALLY_TERMS: [&str; 7] = [
    "tally", "gst", "invoice", "voucher", "ledger", "company", "report",
];

const QUESTION_WEIGHT: u32 = 10;
const KEYWORD_WEIGHT: u32 = 5;
const CATEGORY_WEIGHT: u32 = 3;
const ANSWER_WEIGHT: u32 = 2;
const TALLY_TERM_WEIGHT: u32 = 1;

/// Score one record against a query. Case-insensitive throughout.
///
/// Note the direction of the keyword check: a curated keyword must appear
/// inside the query, the reverse of the question/category/answer checks.
/// Short keywords like "GST" thereby match longer natural-language queries.
pub fn score(query: &str, record: &FaqRecord) -> u32 {
    let query = query.to_lowercase();
    let mut score = 0;

    if record.question.to_lowercase().contains(&query) {
        score += QUESTION_WEIGHT;
    }

    for keyword in &record.keywords {
        if query.contains(&keyword.to_lowercase()) {
            score += KEYWORD_WEIGHT;
        }
    }

    if record.category.to_lowercase().contains(&query) {
        score += CATEGORY_WEIGHT;
    }

    if record.answer.to_lowercase().contains(&query) {
        score += ANSWER_WEIGHT;
    }

    for term in TALLY_TERMS {
        if query.contains(term) {
            score += TALLY_TERM_WEIGHT;
        }
    }

    score
}

/// Score every record and return the positive-scoring ones, sorted
/// descending. The sort is stable, so equal scores keep insertion order.
pub fn search(query: &str, records: &[FaqRecord]) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = records
        .iter()
        .filter_map(|record| {
            let score = score(query, record);
            if score > 0 {
                Some(SearchResult {
                    record: record.clone(),
                    score: score as f32,
                    similarity: 0.0,
                    match_type: MatchType::Keyword,
                })
            } else {
                None
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}
