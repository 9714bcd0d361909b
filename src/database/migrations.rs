//! Schema migrations for the awesomebar SQLite database.
//!
//! Applied versions are recorded in `schema_version`; a database is brought
//! up to `CURRENT_SCHEMA_VERSION` one step at a time.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Highest recorded version, or 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Applies every migration newer than the recorded version.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Legacy history table")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "History metadata table")?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) \
         VALUES (?1, CAST(strftime('%s', 'now') AS INTEGER), ?2)",
        rusqlite::params![version, description],
    )?;
    tracing::info!(version, description, "applied schema migration");
    Ok(())
}

/// V1: legacy history, one row per URL.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS history (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            title TEXT NOT NULL,
            visit_time INTEGER NOT NULL,
            visit_count INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_history_url ON history(url);
        CREATE INDEX IF NOT EXISTS idx_history_visit_time ON history(visit_time);
        ",
    )
}

/// V2: history metadata. Absent search terms and referrers are stored as ''
/// so the uniqueness constraint covers them.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS history_metadata (
            url TEXT NOT NULL,
            search_term TEXT NOT NULL DEFAULT '',
            referrer_url TEXT NOT NULL DEFAULT '',
            title TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            total_view_time INTEGER NOT NULL DEFAULT 0,
            document_type INTEGER NOT NULL DEFAULT 0,
            preview_image_url TEXT,
            UNIQUE (url, search_term, referrer_url)
        );

        CREATE INDEX IF NOT EXISTS idx_history_metadata_url ON history_metadata(url);
        CREATE INDEX IF NOT EXISTS idx_history_metadata_updated_at ON history_metadata(updated_at);
        ",
    )
}
