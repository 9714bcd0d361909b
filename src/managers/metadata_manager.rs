//! History Metadata Manager.
//!
//! Stores per-page observations (view time, document type, title, preview
//! image) keyed by URL plus the search term and referrer that led to it.
//! Backed by the `history_metadata` table.

use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::managers::history_manager::HistoryManager;
use crate::types::errors::MetadataError;
use crate::types::metadata::{
    DocumentType, HistoryMetadata, HistoryMetadataKey, HistoryMetadataObservation,
};

const SELECT_COLUMNS: &str = "SELECT url, search_term, referrer_url, title, created_at, \
     updated_at, total_view_time, document_type, preview_image_url FROM history_metadata";

/// Trait defining history metadata operations.
pub trait MetadataManagerTrait {
    fn note_observation(
        &mut self,
        key: &HistoryMetadataKey,
        observation: HistoryMetadataObservation,
    ) -> Result<(), MetadataError>;
    fn note_title(&mut self, key: &HistoryMetadataKey, title: &str) -> Result<(), MetadataError>;
    fn note_preview_image(
        &mut self,
        key: &HistoryMetadataKey,
        image_url: &str,
    ) -> Result<(), MetadataError>;
    fn query_history_metadata(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<HistoryMetadata>, MetadataError>;
    fn get_latest_for_url(&self, url: &str) -> Result<Option<HistoryMetadata>, MetadataError>;
    fn get_since(&self, since: i64) -> Result<Vec<HistoryMetadata>, MetadataError>;
    fn get_between(&self, start: i64, end: i64) -> Result<Vec<HistoryMetadata>, MetadataError>;
    fn delete_older_than(&mut self, older_than: i64) -> Result<usize, MetadataError>;
    fn delete_metadata(&mut self, key: &HistoryMetadataKey) -> Result<(), MetadataError>;
}

/// Metadata manager backed by a SQLite connection.
pub struct MetadataManager<'a> {
    conn: &'a Connection,
}

impl<'a> MetadataManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the current UNIX timestamp in milliseconds.
    fn now_millis() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn key_parts(key: &HistoryMetadataKey) -> (&str, &str, &str) {
        (
            key.url.as_str(),
            key.search_term.as_deref().unwrap_or(""),
            key.referrer_url.as_deref().unwrap_or(""),
        )
    }

    /// Inserts an empty row for `key` if none exists yet, then bumps `updated_at`.
    fn touch(&self, key: &HistoryMetadataKey) -> Result<(), MetadataError> {
        let (url, search_term, referrer) = Self::key_parts(key);
        let now = Self::now_millis();
        self.conn
            .execute(
                "INSERT INTO history_metadata (url, search_term, referrer_url, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?4) \
                 ON CONFLICT (url, search_term, referrer_url) DO UPDATE SET updated_at = ?4",
                params![url, search_term, referrer, now],
            )
            .map_err(|e| MetadataError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// Upserts the row and applies `assignment` atomically.
    fn update_column<V: rusqlite::ToSql>(
        &self,
        key: &HistoryMetadataKey,
        assignment: &str,
        value: V,
    ) -> Result<(), MetadataError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| MetadataError::DatabaseError(e.to_string()))?;
        self.touch(key)?;
        let (url, search_term, referrer) = Self::key_parts(key);
        let sql = format!(
            "UPDATE history_metadata SET {} \
             WHERE url = ?2 AND search_term = ?3 AND referrer_url = ?4",
            assignment
        );
        self.conn
            .execute(&sql, params![value, url, search_term, referrer])
            .map_err(|e| MetadataError::DatabaseError(e.to_string()))?;
        tx.commit()
            .map_err(|e| MetadataError::DatabaseError(e.to_string()))
    }

    /// Rows written before sums were capped may hold more than `i32::MAX`.
    fn clamp_view_time(total: i64) -> i32 {
        i32::try_from(total.max(0)).unwrap_or(i32::MAX)
    }

    fn row_to_metadata(row: &rusqlite::Row) -> rusqlite::Result<HistoryMetadata> {
        let search_term: String = row.get(1)?;
        let referrer_url: String = row.get(2)?;
        Ok(HistoryMetadata {
            key: HistoryMetadataKey {
                url: row.get(0)?,
                search_term: Some(search_term).filter(|s| !s.is_empty()),
                referrer_url: Some(referrer_url).filter(|s| !s.is_empty()),
            },
            title: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            total_view_time: Self::clamp_view_time(row.get(6)?),
            document_type: DocumentType::from_i32(row.get(7)?),
            preview_image_url: row.get(8)?,
        })
    }

    fn query_rows<P: rusqlite::Params>(
        &self,
        clause: &str,
        params: P,
    ) -> Result<Vec<HistoryMetadata>, MetadataError> {
        let sql = format!("{} {}", SELECT_COLUMNS, clause);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| MetadataError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params, Self::row_to_metadata)
            .map_err(|e| MetadataError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| MetadataError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }
}

impl<'a> MetadataManagerTrait for MetadataManager<'a> {
    /// Records a single observation, creating the metadata row on first sight.
    fn note_observation(
        &mut self,
        key: &HistoryMetadataKey,
        observation: HistoryMetadataObservation,
    ) -> Result<(), MetadataError> {
        match observation {
            HistoryMetadataObservation::ViewTime(ms) => {
                if ms < 0 {
                    return Err(MetadataError::InvalidObservation(format!(
                        "negative view time {} for {}",
                        ms, key.url
                    )));
                }
                self.update_column(
                    key,
                    "total_view_time = MIN(total_view_time + ?1, 2147483647)",
                    ms,
                )
            }
            HistoryMetadataObservation::DocumentType(document_type) => {
                self.update_column(key, "document_type = ?1", document_type.as_i32())
            }
        }
    }

    fn note_title(&mut self, key: &HistoryMetadataKey, title: &str) -> Result<(), MetadataError> {
        self.update_column(key, "title = ?1", title)
    }

    fn note_preview_image(
        &mut self,
        key: &HistoryMetadataKey,
        image_url: &str,
    ) -> Result<(), MetadataError> {
        self.update_column(key, "preview_image_url = ?1", image_url)
    }

    /// Returns up to `limit` rows whose URL, title or search term contains
    /// `query`, longest view time first.
    fn query_history_metadata(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<HistoryMetadata>, MetadataError> {
        if query.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let pattern = HistoryManager::like_pattern(query);
        self.query_rows(
            "WHERE url LIKE ?1 ESCAPE '\\' OR title LIKE ?1 ESCAPE '\\' \
             OR search_term LIKE ?1 ESCAPE '\\' \
             ORDER BY total_view_time DESC, updated_at DESC LIMIT ?2",
            params![pattern, i64::try_from(limit).unwrap_or(i64::MAX)],
        )
    }

    fn get_latest_for_url(&self, url: &str) -> Result<Option<HistoryMetadata>, MetadataError> {
        let sql = format!(
            "{} WHERE url = ?1 ORDER BY updated_at DESC LIMIT 1",
            SELECT_COLUMNS
        );
        self.conn
            .query_row(&sql, params![url], Self::row_to_metadata)
            .optional()
            .map_err(|e| MetadataError::DatabaseError(e.to_string()))
    }

    /// Rows updated at or after `since` (ms), most recent first.
    fn get_since(&self, since: i64) -> Result<Vec<HistoryMetadata>, MetadataError> {
        self.query_rows(
            "WHERE updated_at >= ?1 ORDER BY updated_at DESC",
            params![since],
        )
    }

    /// Rows updated within `[start, end]` (ms), most recent first.
    fn get_between(&self, start: i64, end: i64) -> Result<Vec<HistoryMetadata>, MetadataError> {
        self.query_rows(
            "WHERE updated_at BETWEEN ?1 AND ?2 ORDER BY updated_at DESC",
            params![start, end],
        )
    }

    /// Deletes rows last updated before `older_than` (ms). Returns how many went.
    fn delete_older_than(&mut self, older_than: i64) -> Result<usize, MetadataError> {
        self.conn
            .execute(
                "DELETE FROM history_metadata WHERE updated_at < ?1",
                params![older_than],
            )
            .map_err(|e| MetadataError::DatabaseError(e.to_string()))
    }

    fn delete_metadata(&mut self, key: &HistoryMetadataKey) -> Result<(), MetadataError> {
        let (url, search_term, referrer) = Self::key_parts(key);
        let affected = self
            .conn
            .execute(
                "DELETE FROM history_metadata \
                 WHERE url = ?1 AND search_term = ?2 AND referrer_url = ?3",
                params![url, search_term, referrer],
            )
            .map_err(|e| MetadataError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(MetadataError::NotFound(key.url.clone()));
        }
        Ok(())
    }
}
