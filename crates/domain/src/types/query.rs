//! Structured search filter

use serde::{Deserialize, Serialize};

/// Structured filter fields that the query builder turns into a search
/// string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    pub subject: Option<String>,
    pub from: Option<String>,
    pub older_than_days: Option<i64>,
    pub exclude_starred: bool,
    pub exclude_important: bool,
}
