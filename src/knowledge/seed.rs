//! Bundled TallyPrime FAQ dataset

use anyhow::{Context, Result};

use super::NewFaqRecord;

static FAQ_DATA: &str = include_str!("../../data/faq.json");

/// Parse the bundled dataset. Malformed data is a build artifact problem and
/// fails fast at load time.
pub fn builtin_records() -> Result<Vec<NewFaqRecord>> {
    serde_json::from_str(FAQ_DATA).context("failed to parse bundled FAQ dataset")
}
