// src/commands/component.rs
//! Component management commands

use super::{enabled_mark, seen};
use anyhow::{Context, Result};
use repomgr::db::models::{Component, Distribution};
use tracing::info;

/// Add a component, optionally attaching it to distributions
pub fn cmd_component_add(name: &str, dists: &[String], disabled: bool, db_path: &str) -> Result<()> {
    info!("Adding component: {}", name);
    let mut conn = repomgr::db::open(db_path)?;

    let component = repomgr::db::transaction(&mut conn, |tx| {
        let mut component = Component::get_or_create(tx, name)?;
        if disabled {
            component.set_enabled(tx, false)?;
        }
        for dist_name in dists {
            let dist = Distribution::find_by_name(tx, dist_name)?.ok_or_else(|| {
                repomgr::Error::NotFound(format!("Distribution '{}' not found", dist_name))
            })?;
            dist.add_component(tx, component.id()?)?;
        }
        Ok(component)
    })
    .with_context(|| format!("Failed to add component {}", name))?;

    println!("Added component: {}", component.name);
    println!("  Enabled: {}", component.enabled);
    if !dists.is_empty() {
        println!("  Distributions: {}", dists.join(", "));
    }
    Ok(())
}

/// List components
pub fn cmd_component_list(db_path: &str) -> Result<()> {
    let conn = repomgr::db::open(db_path)?;
    let components = Component::list_all(&conn)?;

    if components.is_empty() {
        println!("No components configured");
        return Ok(());
    }

    println!("Components:");
    for component in components {
        println!(
            "  {} {} ({})",
            enabled_mark(component.enabled),
            component.name,
            seen(&component.last_seen)
        );
    }
    Ok(())
}

/// Enable or disable a component
pub fn cmd_component_set_enabled(name: &str, enabled: bool, db_path: &str) -> Result<()> {
    let conn = repomgr::db::open(db_path)?;
    let mut component = Component::find_by_name(&conn, name)?
        .ok_or_else(|| anyhow::anyhow!("Component '{}' not found", name))?;

    component.set_enabled(&conn, enabled)?;
    println!(
        "{} component: {}",
        if enabled { "Enabled" } else { "Disabled" },
        name
    );
    Ok(())
}
