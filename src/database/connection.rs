//! SQLite connection shared by the legacy history and metadata stores.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use super::migrations;

/// How long a statement waits on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the connection and guarantees the schema is current once constructed.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file at `path` in WAL mode and migrates it.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!(journal_mode = %mode, "opened history database");
        Self::migrated(conn)
    }

    /// In-memory database, discarded on drop.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Highest migration applied to this database.
    pub fn schema_version(&self) -> i32 {
        migrations::get_schema_version(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
