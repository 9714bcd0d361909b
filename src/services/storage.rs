//! Async storage contracts consumed by the suggestion provider.
//!
//! [`HistoryStorage`] and [`HistoryMetadataStorage`] are the two read paths
//! the awesomebar needs. [`PlacesStorage`] implements both on top of the
//! SQLite managers, running each query on tokio's blocking pool so the
//! caller's runtime thread never waits on disk.

use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::database::Database;
use crate::managers::history_manager::{HistoryManager, HistoryManagerTrait};
use crate::managers::metadata_manager::{MetadataManager, MetadataManagerTrait};
use crate::types::errors::{HistoryError, MetadataError};
use crate::types::history::SearchResult;
use crate::types::metadata::HistoryMetadata;

/// Legacy history store: frecency-ranked URL suggestions.
pub trait HistoryStorage: Send + Sync {
    /// Returns up to `limit` history rows matching `query`, best first.
    fn get_suggestions(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<SearchResult>, HistoryError>> + Send;
}

/// History metadata store: pages ranked by accumulated view time.
pub trait HistoryMetadataStorage: Send + Sync {
    /// Returns up to `limit` metadata rows matching `query`, best first.
    fn query_history_metadata(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<HistoryMetadata>, MetadataError>> + Send;
}

/// SQLite-backed implementation of both storage contracts.
#[derive(Clone)]
pub struct PlacesStorage {
    db: Arc<Mutex<Database>>,
}

impl PlacesStorage {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    /// The shared database handle, for callers that write through the managers.
    pub fn database(&self) -> &Arc<Mutex<Database>> {
        &self.db
    }
}

impl HistoryStorage for PlacesStorage {
    async fn get_suggestions(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, HistoryError> {
        let db = Arc::clone(&self.db);
        let query = query.to_string();
        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
            let manager = HistoryManager::new(db.connection());
            manager.get_suggestions(&query, limit)
        })
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "history suggestion task failed");
            HistoryError::DatabaseError(format!("storage task failed: {}", e))
        })?
    }
}

impl HistoryMetadataStorage for PlacesStorage {
    async fn query_history_metadata(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<HistoryMetadata>, MetadataError> {
        let db = Arc::clone(&self.db);
        let query = query.to_string();
        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|e| MetadataError::DatabaseError(e.to_string()))?;
            let manager = MetadataManager::new(db.connection());
            manager.query_history_metadata(&query, limit)
        })
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "history metadata task failed");
            MetadataError::DatabaseError(format!("storage task failed: {}", e))
        })?
    }
}
