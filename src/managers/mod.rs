// Awesomebar state managers
// Managers own the synchronous SQLite operations for each history store.

pub mod history_manager;
pub mod metadata_manager;
