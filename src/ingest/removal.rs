// src/ingest/removal.rs

//! Remove-before-add policy for RPM packages
//!
//! When a package is flagged `remove_on_update` (or named with `--prerm`),
//! everything previously published for it in the RPM tree is swept away
//! before the new version is added: pool files, component symlinks and
//! the bookkeeping rows. The sweep is best effort and not transactional
//! with the publish that follows; a crash in between leaves the package
//! unpublished until the next run.

use super::fsops;
use crate::config::IngestConfig;
use crate::db::models::{BinaryPackage, Distribution, Package, SourcePackage, Vendor};
use crate::error::Result;
use crate::tools::RpmTree;
use rusqlite::Connection;
use std::collections::HashMap;
use tracing::{info, warn};

/// Whether prior artifacts of `package` must be purged before publishing
pub fn should_remove(package: &Package, config: &IngestConfig) -> bool {
    package.remove_on_update || config.is_prerm(&package.name)
}

/// What a sweep removed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Removed {
    pub pool_files: usize,
    pub source_rows: usize,
    pub binary_rows: usize,
}

/// Purge every published artifact of `package` from the RPM tree
pub fn purge(
    conn: &Connection,
    config: &IngestConfig,
    tree: &RpmTree,
    package: &Package,
) -> Result<Removed> {
    info!("Removing previously published versions of {}", package.name);
    let mut removed = Removed::default();

    let pattern = tree.pool_pattern(&package.name);
    match glob::glob(&pattern) {
        Ok(paths) => {
            for path in paths.flatten() {
                fsops::remove_published(config.dry_run, &path)?;
                removed.pool_files += 1;
            }
        }
        Err(e) => warn!("Bad pool pattern {}: {}", pattern, e),
    }

    let rpm_dists: HashMap<i64, Distribution> = Distribution::list_by_vendors(conn, &Vendor::RPM)?
        .into_iter()
        .filter_map(|d| d.id.map(|id| (id, d)))
        .collect();

    let package_id = package.id()?;

    for source in SourcePackage::list_for_package(conn, package_id)? {
        let Some(dist) = rpm_dists.get(&source.distribution_id) else {
            continue;
        };
        let filename = format!(
            "{}-{}.{}.src.rpm",
            package.name, source.version, dist.name
        );
        for component in source.components(conn)? {
            fsops::remove_published(config.dry_run, &tree.link_path(&component.name, &filename))?;
        }
        if let Some(id) = source.id {
            SourcePackage::delete(conn, id)?;
            removed.source_rows += 1;
        }
    }

    for binary in BinaryPackage::list_for_package(conn, package_id)? {
        let Some(dist) = rpm_dists.get(&binary.distribution_id) else {
            continue;
        };
        let filename = format!(
            "{}-{}.{}.{}.rpm",
            binary.name, binary.version, dist.name, binary.arch
        );
        for component in binary.components(conn)? {
            fsops::remove_published(config.dry_run, &tree.link_path(&component.name, &filename))?;
        }
        if let Some(id) = binary.id {
            BinaryPackage::delete(conn, id)?;
            removed.binary_rows += 1;
        }
    }

    Ok(removed)
}
