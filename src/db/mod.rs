// src/db/mod.rs

//! Bookkeeping store for repomgr
//!
//! SQLite holds the publication state: distributions, components, packages,
//! the currently published source/binary rows and the watched incoming
//! directories.

pub mod migrations;
pub mod models;
pub mod schema;

use crate::error::{Error, Result};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Create the database (and its parent directory) and apply migrations
pub fn init(db_path: &str) -> Result<()> {
    info!("Initializing database at {}", db_path);

    if let Some(parent) = Path::new(db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::InitError(format!(
                "Failed to create database directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let conn = connect(db_path)?;
    schema::migrate(&conn)?;
    Ok(())
}

/// Open an existing database
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        return Err(Error::NotFound(format!(
            "Database not found at {} (run `repomgr init` first)",
            db_path
        )));
    }

    let conn = connect(db_path)?;
    schema::migrate(&conn)?;
    Ok(conn)
}

/// Open (creating if needed) and configure a connection
fn connect(db_path: &str) -> Result<Connection> {
    debug!("Opening database {}", db_path);
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(Duration::from_secs(30))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Run `f` inside a transaction, committing only if it succeeds
pub fn transaction<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

/// Current UTC time in the format stored in every timestamp column
///
/// Fixed-width RFC 3339 so that string comparison orders chronologically.
pub fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::schema;
    use rusqlite::Connection;
    use tempfile::NamedTempFile;

    pub fn create_test_db() -> (NamedTempFile, Connection) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        schema::migrate(&conn).unwrap();
        (temp_file, conn)
    }
}
