//! App Core for the awesomebar service.
//!
//! Holds the shared database, the storage adapter and the settings engine,
//! and builds suggestion providers from the current settings.

use std::sync::{Arc, Mutex};

use crate::database::connection::Database;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::storage::PlacesStorage;
use crate::services::suggestion_provider::CombinedHistorySuggestionProvider;
use crate::types::errors::SuggestionError;

/// Provider type wired to the on-disk stores.
pub type PlacesSuggestionProvider = CombinedHistorySuggestionProvider<PlacesStorage, PlacesStorage>;

/// Central application struct.
///
/// `HistoryManager` and `MetadataManager` borrow the connection, so they are
/// created on demand from `db`.
pub struct App {
    pub db: Arc<Mutex<Database>>,
    pub storage: PlacesStorage,
    pub settings_engine: SettingsEngine,
    provider: PlacesSuggestionProvider,
}

impl App {
    /// Opens the database at `db_path` and loads settings.
    ///
    /// `settings_path` overrides the platform config location. A settings file
    /// that fails to load is logged and replaced by defaults in memory.
    pub fn new(db_path: &str, settings_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Mutex::new(Database::open(db_path)?));
        let storage = PlacesStorage::new(Arc::clone(&db));

        let mut settings_engine = SettingsEngine::new(settings_path);
        if let Err(e) = settings_engine.load() {
            tracing::warn!(error = %e, path = settings_engine.get_config_path(), "using default settings");
        }

        let provider = Self::build_provider(&storage, &settings_engine)?;

        Ok(Self {
            db,
            storage,
            settings_engine,
            provider,
        })
    }

    fn build_provider(
        storage: &PlacesStorage,
        settings_engine: &SettingsEngine,
    ) -> Result<PlacesSuggestionProvider, SuggestionError> {
        CombinedHistorySuggestionProvider::from_settings(
            storage.clone(),
            storage.clone(),
            &settings_engine.get_settings().suggestions,
        )
    }

    /// The provider built from the last applied suggestion settings.
    pub fn provider(&self) -> &PlacesSuggestionProvider {
        &self.provider
    }

    /// Rebuilds the provider after the suggestion settings changed.
    pub fn refresh_provider(&mut self) -> Result<(), SuggestionError> {
        self.provider = Self::build_provider(&self.storage, &self.settings_engine)?;
        Ok(())
    }
}
