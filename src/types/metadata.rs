use serde::{Deserialize, Serialize};

/// Identity of a history metadata record.
///
/// The same URL may be stored several times when it was reached through
/// different search terms or referrers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryMetadataKey {
    pub url: String,
    pub search_term: Option<String>,
    pub referrer_url: Option<String>,
}

impl HistoryMetadataKey {
    /// Key for a page reached without a search term or referrer.
    pub fn for_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            search_term: None,
            referrer_url: None,
        }
    }
}

/// Kind of document the metadata was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Regular,
    Media,
}

impl DocumentType {
    pub fn as_i32(self) -> i32 {
        match self {
            DocumentType::Regular => 0,
            DocumentType::Media => 1,
        }
    }

    /// Unknown tags fall back to `Regular`.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => DocumentType::Media,
            _ => DocumentType::Regular,
        }
    }
}

/// Snapshot of a visited page's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMetadata {
    pub key: HistoryMetadataKey,
    pub title: Option<String>,
    /// Milliseconds since the UNIX epoch.
    pub created_at: i64,
    /// Milliseconds since the UNIX epoch.
    pub updated_at: i64,
    /// Accumulated view time in milliseconds.
    pub total_view_time: i32,
    pub document_type: DocumentType,
    pub preview_image_url: Option<String>,
}

/// A single fact observed about a page while it was open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryMetadataObservation {
    ViewTime(i32),
    DocumentType(DocumentType),
}
