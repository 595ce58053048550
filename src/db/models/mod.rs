// src/db/models/mod.rs

//! Data models for the bookkeeping store
//!
//! This module defines Rust structs that correspond to database tables
//! and provides methods for creating, reading, updating, and deleting records.

mod binary_package;
mod component;
mod distribution;
mod incoming;
mod package;
mod source_package;

pub use binary_package::{BinaryKey, BinaryPackage};
pub use component::{Component, component_names};
pub use distribution::{Distribution, Vendor, VendorFamily};
pub use incoming::IncomingDirectory;
pub use package::Package;
pub use source_package::SourcePackage;

use crate::error::{Error, Result};
use rusqlite::{Connection, params};

/// Id of a record that must already be stored
pub(crate) fn require_id(id: Option<i64>, kind: &str, name: &str) -> Result<i64> {
    id.ok_or_else(|| Error::InitError(format!("{kind} '{name}' has not been stored")))
}

/// Advance `last_seen` on one row, never moving it backwards
///
/// Returns the value stored after the update.
pub(crate) fn touch_last_seen(conn: &Connection, table: &str, id: i64) -> Result<String> {
    let now = crate::db::now();

    conn.execute(
        &format!(
            "UPDATE {table} SET last_seen = ?1
             WHERE id = ?2 AND (last_seen IS NULL OR last_seen < ?1)"
        ),
        params![&now, id],
    )?;

    let stored: Option<String> = conn.query_row(
        &format!("SELECT last_seen FROM {table} WHERE id = ?1"),
        [id],
        |row| row.get(0),
    )?;

    Ok(stored.unwrap_or(now))
}

/// Replace the component links of a publication row (cleared, then added)
pub(crate) fn replace_components(
    conn: &Connection,
    link_table: &str,
    owner_column: &str,
    owner_id: i64,
    components: &[Component],
) -> Result<()> {
    conn.execute(
        &format!("DELETE FROM {link_table} WHERE {owner_column} = ?1"),
        [owner_id],
    )?;

    let sql = format!(
        "INSERT OR IGNORE INTO {link_table} ({owner_column}, component_id) VALUES (?1, ?2)"
    );
    for component in components {
        conn.execute(&sql, params![owner_id, component.id()?])?;
    }

    Ok(())
}
