use serde::{Deserialize, Serialize};

/// Represents a single history entry for a visited page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub url: String,
    pub title: String,
    pub visit_time: i64,
    pub visit_count: i32,
}

/// A history row matched by a suggestion query, carrying its frecency score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub url: String,
    pub title: String,
    pub score: i32,
}
