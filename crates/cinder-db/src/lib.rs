//! # cinder-db
//!
//! Persistence layer for the cinder daemon.
//! Manages the single SQLite database at `$CINDER_DATA_DIR/cinder.db`.
//!
//! Two tables matter:
//! - `registrations` — domain -> alert registrations, the durable store
//!   read wholesale each evaluation cycle and stamped on every fire.
//! - `chat_links` — handle -> chat recipient id, written by the
//!   out-of-band linking flow and read at chat delivery time.
//!
//! WAL mode is mandatory; schema version lives in `PRAGMA user_version`.
//! All heights are chain block heights (i64); NULL means "never fired".

pub mod migrations;
pub mod queries;
pub mod schema;

use rusqlite::Connection;
use std::path::Path;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("invalid registration: {0}")]
    Invalid(#[from] cinder_types::ValidationError),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Open or create the cinder database at the given path.
///
/// Configures WAL mode and runs any pending migrations.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Configure SQLite pragmas.
fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}
