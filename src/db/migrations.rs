// src/db/migrations.rs
//! Database migration implementations
//!
//! Each function brings the schema up by exactly one version.

use crate::error::Result;
use rusqlite::Connection;
use tracing::{debug, info};

/// Initial schema - Version 1
///
/// Creates the bookkeeping tables:
/// - distributions / components / packages and their memberships
/// - source_packages / binary_packages: current publication per target
/// - incoming_directories: watched upload locations
pub fn migrate_v1(conn: &Connection) -> Result<()> {
    debug!("Creating schema version 1");

    conn.execute_batch(
        "
        CREATE TABLE components (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            enabled INTEGER NOT NULL DEFAULT 1,
            last_seen TEXT
        );

        CREATE TABLE distributions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            vendor TEXT NOT NULL CHECK(vendor IN ('debian', 'ubuntu', 'fedora', 'redhat')),
            last_seen TEXT
        );

        CREATE TABLE distribution_components (
            distribution_id INTEGER NOT NULL,
            component_id INTEGER NOT NULL,
            PRIMARY KEY (distribution_id, component_id),
            FOREIGN KEY (distribution_id) REFERENCES distributions(id) ON DELETE CASCADE,
            FOREIGN KEY (component_id) REFERENCES components(id) ON DELETE CASCADE
        );

        CREATE TABLE packages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            last_seen TEXT,
            all_components INTEGER NOT NULL DEFAULT 0,
            all_distributions INTEGER NOT NULL DEFAULT 0,
            remove_on_update INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE package_components (
            package_id INTEGER NOT NULL,
            component_id INTEGER NOT NULL,
            PRIMARY KEY (package_id, component_id),
            FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
            FOREIGN KEY (component_id) REFERENCES components(id) ON DELETE CASCADE
        );

        -- One row per (package, distribution): the currently published source
        CREATE TABLE source_packages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            package_id INTEGER NOT NULL,
            distribution_id INTEGER NOT NULL,
            version TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            UNIQUE(package_id, distribution_id),
            FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
            FOREIGN KEY (distribution_id) REFERENCES distributions(id) ON DELETE CASCADE
        );

        CREATE TABLE source_package_components (
            source_package_id INTEGER NOT NULL,
            component_id INTEGER NOT NULL,
            PRIMARY KEY (source_package_id, component_id),
            FOREIGN KEY (source_package_id) REFERENCES source_packages(id) ON DELETE CASCADE,
            FOREIGN KEY (component_id) REFERENCES components(id) ON DELETE CASCADE
        );

        -- One row per (package, binary name, distribution, arch)
        CREATE TABLE binary_packages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            package_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            distribution_id INTEGER NOT NULL,
            arch TEXT NOT NULL,
            version TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            UNIQUE(package_id, name, distribution_id, arch),
            FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
            FOREIGN KEY (distribution_id) REFERENCES distributions(id) ON DELETE CASCADE
        );

        CREATE INDEX idx_binary_packages_name ON binary_packages(name);

        CREATE TABLE binary_package_components (
            binary_package_id INTEGER NOT NULL,
            component_id INTEGER NOT NULL,
            PRIMARY KEY (binary_package_id, component_id),
            FOREIGN KEY (binary_package_id) REFERENCES binary_packages(id) ON DELETE CASCADE,
            FOREIGN KEY (component_id) REFERENCES components(id) ON DELETE CASCADE
        );

        CREATE TABLE incoming_directories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            location TEXT NOT NULL UNIQUE,
            enabled INTEGER NOT NULL DEFAULT 1
        );
        ",
    )?;

    info!("Schema version 1 created successfully");
    Ok(())
}
