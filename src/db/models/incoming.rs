// src/db/models/incoming.rs

//! IncomingDirectory model - watched upload locations

use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A filesystem location scanned for new uploads
#[derive(Debug, Clone)]
pub struct IncomingDirectory {
    pub id: Option<i64>,
    pub location: String,
    pub enabled: bool,
}

impl IncomingDirectory {
    /// Create a new, enabled IncomingDirectory
    pub fn new(location: String) -> Self {
        Self {
            id: None,
            location,
            enabled: true,
        }
    }

    /// Insert this directory into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO incoming_directories (location, enabled) VALUES (?1, ?2)",
            params![&self.location, self.enabled],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a directory by location
    pub fn find_by_location(conn: &Connection, location: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, location, enabled FROM incoming_directories WHERE location = ?1",
        )?;

        let dir = stmt.query_row([location], Self::from_row).optional()?;
        Ok(dir)
    }

    /// List all directories, ordered by location
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn
            .prepare("SELECT id, location, enabled FROM incoming_directories ORDER BY location")?;

        let dirs = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(dirs)
    }

    /// List enabled directories, ordered by location
    pub fn list_enabled(conn: &Connection) -> Result<Vec<Self>> {
        Ok(Self::list_all(conn)?
            .into_iter()
            .filter(|d| d.enabled)
            .collect())
    }

    /// Enable or disable this directory
    pub fn set_enabled(&mut self, conn: &Connection, enabled: bool) -> Result<()> {
        let id = self.id.ok_or_else(|| {
            Error::InitError("Cannot update incoming directory without ID".to_string())
        })?;

        conn.execute(
            "UPDATE incoming_directories SET enabled = ?1 WHERE id = ?2",
            params![enabled, id],
        )?;
        self.enabled = enabled;
        Ok(())
    }

    /// Convert a database row to an IncomingDirectory
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            location: row.get(1)?,
            enabled: row.get(2)?,
        })
    }
}
