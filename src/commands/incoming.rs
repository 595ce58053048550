// src/commands/incoming.rs
//! Incoming directory commands

use super::enabled_mark;
use anyhow::Result;
use repomgr::db::models::IncomingDirectory;
use std::path::Path;
use tracing::info;

/// Start watching a directory
pub fn cmd_incoming_add(location: &str, disabled: bool, db_path: &str) -> Result<()> {
    info!("Adding incoming directory: {}", location);
    if !Path::new(location).is_absolute() {
        anyhow::bail!("Incoming directory must be an absolute path: {}", location);
    }

    let conn = repomgr::db::open(db_path)?;
    if IncomingDirectory::find_by_location(&conn, location)?.is_some() {
        anyhow::bail!("Incoming directory already exists: {}", location);
    }

    let mut incoming = IncomingDirectory::new(location.to_string());
    incoming.enabled = !disabled;
    incoming.insert(&conn)?;

    println!("Added incoming directory: {}", incoming.location);
    println!("  Enabled: {}", incoming.enabled);
    if !Path::new(location).is_dir() {
        println!("  Warning: {} does not exist yet", location);
    }
    Ok(())
}

/// List watched directories
pub fn cmd_incoming_list(db_path: &str) -> Result<()> {
    let conn = repomgr::db::open(db_path)?;
    let dirs = IncomingDirectory::list_all(&conn)?;

    if dirs.is_empty() {
        println!("No incoming directories configured");
        return Ok(());
    }

    println!("Incoming directories:");
    for dir in dirs {
        println!("  {} {}", enabled_mark(dir.enabled), dir.location);
    }
    Ok(())
}

/// Enable or disable a watched directory
pub fn cmd_incoming_set_enabled(location: &str, enabled: bool, db_path: &str) -> Result<()> {
    let conn = repomgr::db::open(db_path)?;
    let mut incoming = IncomingDirectory::find_by_location(&conn, location)?
        .ok_or_else(|| anyhow::anyhow!("Incoming directory '{}' not found", location))?;

    incoming.set_enabled(&conn, enabled)?;
    println!(
        "{} incoming directory: {}",
        if enabled { "Enabled" } else { "Disabled" },
        location
    );
    Ok(())
}
