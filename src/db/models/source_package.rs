// src/db/models/source_package.rs

//! SourcePackage model - the current published source of a package in a
//! distribution

use super::component::Component;
use super::replace_components;
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// Published source package; at most one per (package, distribution)
#[derive(Debug, Clone)]
pub struct SourcePackage {
    pub id: Option<i64>,
    pub package_id: i64,
    pub distribution_id: i64,
    pub version: String,
    pub timestamp: String,
}

impl SourcePackage {
    /// Find the row for a (package, distribution) pair
    pub fn find(conn: &Connection, package_id: i64, distribution_id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, package_id, distribution_id, version, timestamp
             FROM source_packages WHERE package_id = ?1 AND distribution_id = ?2",
        )?;

        let row = stmt
            .query_row(params![package_id, distribution_id], Self::from_row)
            .optional()?;
        Ok(row)
    }

    /// Record a successful publication
    ///
    /// Updates the existing row in place (version, timestamp) and replaces
    /// its component set with exactly `components`; inserts a new row on
    /// first publication.
    pub fn record(
        conn: &Connection,
        package_id: i64,
        distribution_id: i64,
        version: &str,
        components: &[Component],
    ) -> Result<Self> {
        let timestamp = crate::db::now();

        let id = match Self::find(conn, package_id, distribution_id)? {
            Some(existing) => {
                let id = existing.id.unwrap_or_default();
                conn.execute(
                    "UPDATE source_packages SET version = ?1, timestamp = ?2 WHERE id = ?3",
                    params![version, &timestamp, id],
                )?;
                id
            }
            None => {
                conn.execute(
                    "INSERT INTO source_packages (package_id, distribution_id, version, timestamp)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![package_id, distribution_id, version, &timestamp],
                )?;
                conn.last_insert_rowid()
            }
        };

        replace_components(conn, "source_package_components", "source_package_id", id, components)?;

        Ok(Self {
            id: Some(id),
            package_id,
            distribution_id,
            version: version.to_string(),
            timestamp,
        })
    }

    /// All source rows owned by packages named `name`, oldest first
    pub fn find_by_package_name(conn: &Connection, name: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT s.id, s.package_id, s.distribution_id, s.version, s.timestamp
             FROM source_packages s JOIN packages p ON p.id = s.package_id
             WHERE p.name = ?1 ORDER BY s.id",
        )?;

        let rows = stmt
            .query_map([name], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// All source rows of a package
    pub fn list_for_package(conn: &Connection, package_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, package_id, distribution_id, version, timestamp
             FROM source_packages WHERE package_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map([package_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Components currently carrying this source package
    pub fn components(&self, conn: &Connection) -> Result<Vec<Component>> {
        Component::query(
            conn,
            "SELECT c.id, c.name, c.enabled, c.last_seen FROM components c
             JOIN source_package_components sc ON sc.component_id = c.id
             WHERE sc.source_package_id = ?1 ORDER BY c.name",
            params![self.id],
        )
    }

    /// Delete a source row (its component links cascade)
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        conn.execute("DELETE FROM source_packages WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Convert a database row to a SourcePackage
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            package_id: row.get(1)?,
            distribution_id: row.get(2)?,
            version: row.get(3)?,
            timestamp: row.get(4)?,
        })
    }
}
