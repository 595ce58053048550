// src/commands/mod.rs
//! Command handlers for the repomgr CLI

mod component;
mod dist;
mod incoming;
mod package;
mod process;

pub use component::{cmd_component_add, cmd_component_list, cmd_component_set_enabled};
pub use dist::{cmd_dist_add, cmd_dist_list};
pub use incoming::{cmd_incoming_add, cmd_incoming_list, cmd_incoming_set_enabled};
pub use package::{PackagePolicy, cmd_package_add, cmd_package_list};
pub use process::cmd_process_incoming;

use anyhow::Result;
use tracing::info;

/// Create or migrate the database
pub fn cmd_init(db_path: &str) -> Result<()> {
    info!("Initializing repomgr database at: {}", db_path);
    repomgr::db::init(db_path)?;
    println!("Database initialized successfully at: {}", db_path);
    Ok(())
}

/// Render an optional timestamp for listings
fn seen(last_seen: &Option<String>) -> String {
    last_seen
        .as_ref()
        .map(|ts| format!("last seen {}", ts))
        .unwrap_or_else(|| "never seen".to_string())
}

fn enabled_mark(enabled: bool) -> &'static str {
    if enabled { "[x]" } else { "[ ]" }
}
