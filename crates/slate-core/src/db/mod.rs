//! The on-disk plan store.
//!
//! One SQLite file per project at `.slate/slate.db`. [`open_store`] is the
//! only way a connection is made, so every connection enforces the
//! `semester_courses` foreign keys: deleting a course or semester row drops
//! its placements with it.

pub mod migrations;
pub mod schema;
pub mod store;

pub use store::{SqliteStore, StoreMeta};

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{path::Path, time::Duration};

/// How long a connection waits on another session's flush.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the store at `path`, creating `.slate/` and the schema if needed.
///
/// # Errors
///
/// Fails if the directory cannot be created, the file is not a database,
/// or a schema migration fails.
pub fn open_store(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create store directory {}", dir.display()))?;
    }
    let mut conn =
        Connection::open(path).with_context(|| format!("open store {}", path.display()))?;
    configure_connection(&conn).context("configure store connection")?;
    migrations::migrate(&mut conn).context("migrate store schema")?;
    Ok(conn)
}

/// Foreign keys on, WAL journal, relaxed fsync, and the busy timeout.
pub(crate) fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)
}
