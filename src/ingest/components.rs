// src/ingest/components.rs

//! Which components a publication targets
//!
//! Resolution is recomputed for every upload from the current bookkeeping
//! state:
//!
//! - `all_components` packages go to every enabled component of the
//!   distribution.
//! - Otherwise the package's explicit memberships that belong to the
//!   distribution win, if there are any; if not, the enabled components of
//!   the distribution are the default.
//! - RPM binaries for a real architecture only go to `<name>-<arch>`
//!   components. Source and `noarch` packages go everywhere.
//!
//! Every resolved component has its `last_seen` advanced.

use crate::db::models::{Component, Distribution, Package};
use crate::error::Result;
use rusqlite::Connection;

/// Architecture constraint applied during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchFilter<'a> {
    /// Debian: reprepro routes architectures itself
    Any,
    /// RPM: restrict to components named `<name>-<arch>`
    Rpm(&'a str),
}

impl ArchFilter<'_> {
    fn admits(&self, component: &Component) -> bool {
        match self {
            ArchFilter::Any => true,
            ArchFilter::Rpm("noarch" | "src") => true,
            ArchFilter::Rpm(arch) => component.matches_arch(arch),
        }
    }
}

/// Resolve the target components of `package` in `dist`
pub fn resolve(
    conn: &Connection,
    package: &Package,
    dist: &Distribution,
    arch: ArchFilter<'_>,
) -> Result<Vec<Component>> {
    let admitted = |components: Vec<Component>| -> Vec<Component> {
        components.into_iter().filter(|c| arch.admits(c)).collect()
    };

    let mut targets = if package.all_components {
        admitted(dist.enabled_components(conn)?)
    } else {
        let explicit = admitted(package.components_in_distribution(conn, dist.id()?)?);
        if explicit.is_empty() {
            admitted(dist.enabled_components(conn)?)
        } else {
            explicit
        }
    };

    for component in &mut targets {
        component.touch(conn)?;
    }

    Ok(targets)
}
