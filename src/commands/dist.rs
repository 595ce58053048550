// src/commands/dist.rs
//! Distribution management commands

use super::seen;
use anyhow::{Context, Result};
use repomgr::db::models::{Component, Distribution, Vendor, component_names};
use tracing::info;

/// Add a distribution and attach components to it
pub fn cmd_dist_add(name: &str, vendor: &str, components: &[String], db_path: &str) -> Result<()> {
    info!("Adding distribution: {} ({})", name, vendor);
    let vendor: Vendor = vendor.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let mut conn = repomgr::db::open(db_path)?;
    let dist = repomgr::db::transaction(&mut conn, |tx| {
        let dist = match Distribution::find_by_name(tx, name)? {
            Some(existing) => existing,
            None => {
                let mut dist = Distribution::new(name.to_string(), vendor);
                dist.insert(tx)?;
                dist
            }
        };
        for component in components {
            let component = Component::get_or_create(tx, component)?;
            dist.add_component(tx, component.id()?)?;
        }
        Ok(dist)
    })
    .with_context(|| format!("Failed to add distribution {}", name))?;

    if dist.vendor != vendor {
        println!(
            "Distribution {} already exists with vendor {}",
            dist.name, dist.vendor
        );
    }
    println!("Added distribution: {}", dist.name);
    println!("  Vendor: {}", dist.vendor);
    println!("  Components: {}", component_names(&dist.components(&conn)?));
    Ok(())
}

/// List distributions
pub fn cmd_dist_list(db_path: &str) -> Result<()> {
    let conn = repomgr::db::open(db_path)?;
    let dists = Distribution::list_all(&conn)?;

    if dists.is_empty() {
        println!("No distributions configured");
        return Ok(());
    }

    println!("Distributions:");
    for dist in dists {
        println!("  {} ({}, {})", dist.name, dist.vendor, seen(&dist.last_seen));
        let components = dist.components(&conn)?;
        if !components.is_empty() {
            println!("      {}", component_names(&components));
        }
    }
    Ok(())
}
