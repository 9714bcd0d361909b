use serde::{Deserialize, Serialize};

/// An entry shown in the address-bar dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Stable per query; the suggestion URL.
    pub id: String,
    pub provider_id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub score: i32,
}
