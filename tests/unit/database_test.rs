//! Unit tests for the awesomebar database layer (connection + migrations).

use awesomebar::database::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use awesomebar::database::Database;

fn object_exists(db: &Database, kind: &str, name: &str) -> bool {
    db.connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = ?1 AND name = ?2",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap_or(false)
}

#[test]
fn test_open_in_memory_succeeds() {
    assert!(Database::open_in_memory().is_ok());
}

#[test]
fn test_migrations_create_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");

    for table in ["schema_version", "history", "history_metadata"] {
        assert!(object_exists(&db, "table", table), "Table '{}' should exist", table);
    }
}

#[test]
fn test_migrations_create_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");

    for index in [
        "idx_history_url",
        "idx_history_visit_time",
        "idx_history_metadata_url",
        "idx_history_metadata_updated_at",
    ] {
        assert!(object_exists(&db, "index", index), "Index '{}' should exist", index);
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
    assert_eq!(db.schema_version(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_on_disk_database_uses_wal() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("awesomebar.db")).expect("open failed");
    let mode: String = db
        .connection()
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn test_reopen_on_disk_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("awesomebar.db");

    {
        let db = Database::open(&path).expect("first open failed");
        db.connection()
            .execute(
                "INSERT INTO history (id, url, title, visit_time, visit_count) \
                 VALUES ('1', 'https://example.com', 'Example', 0, 1)",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&path).expect("second open failed");
    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);

    let versions: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(versions, i64::from(CURRENT_SCHEMA_VERSION));
}

#[test]
fn test_metadata_key_is_unique() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let insert = "INSERT INTO history_metadata (url, created_at, updated_at) \
                  VALUES ('https://example.com', 0, 0)";

    db.connection().execute(insert, []).unwrap();
    assert!(db.connection().execute(insert, []).is_err());
}
