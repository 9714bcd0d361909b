//! History Manager for the legacy history store.
//!
//! Implements `HistoryManagerTrait`: recording visits, searching, listing,
//! clearing, and producing frecency-scored suggestions, backed by SQLite via
//! `rusqlite`.

use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::types::errors::HistoryError;
use crate::types::history::{HistoryEntry, SearchResult};

const DAY_SECS: i64 = 86_400;

/// Recency buckets as (max age in days, weight). Older visits fall back to
/// `STALE_VISIT_WEIGHT`.
const RECENCY_BUCKETS: [(i64, i32); 4] = [(4, 100), (14, 70), (31, 50), (90, 30)];
const STALE_VISIT_WEIGHT: i32 = 10;

/// Trait defining history management operations.
pub trait HistoryManagerTrait {
    fn record_visit(&mut self, url: &str, title: &str) -> Result<String, HistoryError>;
    fn record_visit_at(
        &mut self,
        url: &str,
        title: &str,
        visit_time: i64,
    ) -> Result<String, HistoryError>;
    fn search_history(&self, query: &str) -> Result<Vec<HistoryEntry>, HistoryError>;
    fn list_history(&self, date: Option<&str>) -> Result<Vec<HistoryEntry>, HistoryError>;
    fn get_suggestions(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, HistoryError>;
    fn delete_entry(&mut self, id: &str) -> Result<(), HistoryError>;
    fn clear_all(&mut self) -> Result<(), HistoryError>;
    fn is_recording_enabled(&self) -> bool;
    fn set_recording_enabled(&mut self, enabled: bool);
}

/// History manager backed by a SQLite connection.
pub struct HistoryManager<'a> {
    conn: &'a Connection,
    recording_enabled: bool,
}

impl<'a> HistoryManager<'a> {
    /// Creates a new `HistoryManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            recording_enabled: true,
        }
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    /// Parses a "YYYY-MM-DD" date string into a UNIX timestamp (start of day UTC).
    fn parse_date_to_timestamp(date: &str) -> Result<i64, String> {
        let parts: Vec<&str> = date.split('-').collect();
        if parts.len() != 3 {
            return Err(format!("Invalid date format: {}", date));
        }
        let year: i64 = parts[0]
            .parse()
            .map_err(|_| format!("Invalid year: {}", parts[0]))?;
        let month: i64 = parts[1]
            .parse()
            .map_err(|_| format!("Invalid month: {}", parts[1]))?;
        let day: i64 = parts[2]
            .parse()
            .map_err(|_| format!("Invalid day: {}", parts[2]))?;

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(format!("Invalid date: {}", date));
        }

        // Days from civil date, March-based year.
        let mut y = year;
        let mut m = month;
        if m <= 2 {
            y -= 1;
            m += 12;
        }
        let days = 365 * y + y / 4 - y / 100 + y / 400 + (153 * (m - 3) + 2) / 5 + day - 719469;
        Ok(days * DAY_SECS)
    }

    /// Frecency weight for a visit `age_secs` old.
    pub fn recency_weight(age_secs: i64) -> i32 {
        let age_days = age_secs.max(0) / DAY_SECS;
        RECENCY_BUCKETS
            .iter()
            .find(|(max_days, _)| age_days <= *max_days)
            .map(|(_, weight)| *weight)
            .unwrap_or(STALE_VISIT_WEIGHT)
    }

    /// Frecency score of a row with `visit_count` visits, last seen at `visit_time`.
    pub fn frecency(visit_count: i32, visit_time: i64, now: i64) -> i32 {
        visit_count
            .max(0)
            .saturating_mul(Self::recency_weight(now - visit_time))
    }

    /// Builds a `LIKE` pattern matching `query` anywhere, with wildcards escaped.
    pub(crate) fn like_pattern(query: &str) -> String {
        let mut escaped = String::with_capacity(query.len() + 2);
        escaped.push('%');
        for c in query.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push('%');
        escaped
    }

    /// Reads a single `HistoryEntry` row into a struct.
    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
        Ok(HistoryEntry {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            visit_time: row.get(3)?,
            visit_count: row.get(4)?,
        })
    }

    fn query_entries<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params, Self::row_to_entry)
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| HistoryError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }
}

impl<'a> HistoryManagerTrait for HistoryManager<'a> {
    /// Records a page visit now. Returns the entry ID.
    fn record_visit(&mut self, url: &str, title: &str) -> Result<String, HistoryError> {
        self.record_visit_at(url, title, Self::now())
    }

    /// Records a page visit at `visit_time` (UNIX seconds). If the URL already
    /// exists, increments visit_count and updates the visit_time and title.
    fn record_visit_at(
        &mut self,
        url: &str,
        title: &str,
        visit_time: i64,
    ) -> Result<String, HistoryError> {
        if !self.recording_enabled {
            return Err(HistoryError::RecordingDisabled);
        }

        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM history WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        match existing {
            Some(id) => {
                self.conn
                    .execute(
                        "UPDATE history SET visit_count = visit_count + 1, \
                         visit_time = MAX(visit_time, ?1), title = ?2 WHERE id = ?3",
                        params![visit_time, title, id],
                    )
                    .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
                Ok(id)
            }
            None => {
                let id = Uuid::new_v4().to_string();
                self.conn
                    .execute(
                        "INSERT INTO history (id, url, title, visit_time, visit_count) VALUES (?1, ?2, ?3, ?4, 1)",
                        params![id, url, title, visit_time],
                    )
                    .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
                Ok(id)
            }
        }
    }

    /// Searches history entries by title or URL using SQL LIKE.
    fn search_history(&self, query: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let pattern = Self::like_pattern(query);
        self.query_entries(
            "SELECT id, url, title, visit_time, visit_count \
             FROM history WHERE title LIKE ?1 ESCAPE '\\' OR url LIKE ?1 ESCAPE '\\' \
             ORDER BY visit_time DESC",
            params![pattern],
        )
    }

    /// Lists history entries ordered by visit_time DESC.
    /// If `date` is provided (format "YYYY-MM-DD"), filters to that day.
    fn list_history(&self, date: Option<&str>) -> Result<Vec<HistoryEntry>, HistoryError> {
        match date {
            Some(d) => {
                let start = Self::parse_date_to_timestamp(d).map_err(HistoryError::InvalidInput)?;
                let end = start + DAY_SECS;
                self.query_entries(
                    "SELECT id, url, title, visit_time, visit_count \
                     FROM history WHERE visit_time >= ?1 AND visit_time < ?2 \
                     ORDER BY visit_time DESC",
                    params![start, end],
                )
            }
            None => self.query_entries(
                "SELECT id, url, title, visit_time, visit_count \
                 FROM history ORDER BY visit_time DESC",
                [],
            ),
        }
    }

    /// Returns up to `limit` entries matching `query`, highest frecency first.
    fn get_suggestions(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, HistoryError> {
        if query.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let now = Self::now();
        let mut scored: Vec<(i64, SearchResult)> = self
            .search_history(query)?
            .into_iter()
            .map(|entry| {
                let score = Self::frecency(entry.visit_count, entry.visit_time, now);
                (
                    entry.visit_time,
                    SearchResult {
                        id: entry.id,
                        url: entry.url,
                        title: entry.title,
                        score,
                    },
                )
            })
            .collect();

        // Rows arrive most recent first; a stable sort keeps that as the tiebreak.
        scored.sort_by(|a, b| b.1.score.cmp(&a.1.score));
        scored.truncate(limit);
        Ok(scored.into_iter().map(|(_, result)| result).collect())
    }

    /// Deletes a single history entry by ID.
    fn delete_entry(&mut self, id: &str) -> Result<(), HistoryError> {
        let affected = self
            .conn
            .execute("DELETE FROM history WHERE id = ?1", params![id])
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(HistoryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Clears all history entries.
    fn clear_all(&mut self) -> Result<(), HistoryError> {
        self.conn
            .execute("DELETE FROM history", [])
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn is_recording_enabled(&self) -> bool {
        self.recording_enabled
    }

    /// Enables or disables history recording (for private mode integration).
    fn set_recording_enabled(&mut self, enabled: bool) {
        self.recording_enabled = enabled;
    }
}
