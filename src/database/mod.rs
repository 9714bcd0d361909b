//! SQLite persistence for the legacy history table and the history metadata
//! table.
//!
//! ```no_run
//! use awesomebar::database::Database;
//!
//! let db = Database::open("awesomebar.db").expect("failed to open database");
//! assert_eq!(db.schema_version(), awesomebar::database::migrations::CURRENT_SCHEMA_VERSION);
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
