// src/commands/package.rs
//! Package policy commands

use super::seen;
use anyhow::{Context, Result};
use repomgr::db::models::{
    BinaryPackage, Component, Distribution, Package, SourcePackage, component_names,
};
use std::collections::HashMap;
use tracing::info;

/// Publication policy flags given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct PackagePolicy {
    pub all_components: bool,
    pub all_distributions: bool,
    pub remove_on_update: bool,
}

/// Add a package or replace the policy of an existing one
pub fn cmd_package_add(
    name: &str,
    policy: PackagePolicy,
    components: &[String],
    db_path: &str,
) -> Result<()> {
    info!("Adding package: {}", name);
    let mut conn = repomgr::db::open(db_path)?;

    let package = repomgr::db::transaction(&mut conn, |tx| {
        let mut package = Package::get_or_create(tx, name)?;
        package.all_components = policy.all_components;
        package.all_distributions = policy.all_distributions;
        package.remove_on_update = policy.remove_on_update;
        package.update(tx)?;

        for component in components {
            let component = Component::get_or_create(tx, component)?;
            package.add_component(tx, component.id()?)?;
        }
        Ok(package)
    })
    .with_context(|| format!("Failed to add package {}", name))?;

    println!("Package: {}", package.name);
    println!("  All components: {}", package.all_components);
    println!("  All distributions: {}", package.all_distributions);
    println!("  Remove on update: {}", package.remove_on_update);
    println!("  Components: {}", component_names(&package.components(&conn)?));
    Ok(())
}

/// List packages with their current publications
pub fn cmd_package_list(name: Option<&str>, db_path: &str) -> Result<()> {
    let conn = repomgr::db::open(db_path)?;

    let packages = match name {
        Some(name) => vec![
            Package::find_by_name(&conn, name)?
                .ok_or_else(|| anyhow::anyhow!("Package '{}' not found", name))?,
        ],
        None => Package::list_all(&conn)?,
    };

    if packages.is_empty() {
        println!("No packages known");
        return Ok(());
    }

    let dist_names: HashMap<i64, String> = Distribution::list_all(&conn)?
        .into_iter()
        .filter_map(|d| d.id.map(|id| (id, d.name)))
        .collect();
    let dist_name = |id: i64| dist_names.get(&id).map_or("?", String::as_str);

    for package in packages {
        let mut flags = Vec::new();
        if package.all_components {
            flags.push("all-components");
        }
        if package.all_distributions {
            flags.push("all-distributions");
        }
        if package.remove_on_update {
            flags.push("remove-on-update");
        }
        println!("{} ({})", package.name, seen(&package.last_seen));
        if !flags.is_empty() {
            println!("  Policy: {}", flags.join(", "));
        }

        let package_id = package.id()?;
        for source in SourcePackage::list_for_package(&conn, package_id)? {
            println!(
                "  source {} in {} [{}]",
                source.version,
                dist_name(source.distribution_id),
                component_names(&source.components(&conn)?)
            );
        }
        for binary in BinaryPackage::list_for_package(&conn, package_id)? {
            println!(
                "  {} {} ({}) in {} [{}]",
                binary.name,
                binary.version,
                binary.arch,
                dist_name(binary.distribution_id),
                component_names(&binary.components(&conn)?)
            );
        }
    }
    Ok(())
}
