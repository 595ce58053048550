// src/ingest/mod.rs

//! Incoming-directory ingestion
//!
//! One batch walks every enabled incoming directory in location order,
//! routes each entry to the Debian or RPM pipeline, and finishes with
//! createrepo regeneration and (optionally) SELinux relabeling.
//!
//! Items are independent: an error while processing one upload is logged
//! and counted in the [`IngestReport`], then the batch moves on. Only
//! errors for which [`Error::is_fatal`] holds abort the run.

pub mod components;
mod debian;
pub mod fsops;
pub mod removal;
mod rpm;
pub mod scanner;

use crate::config::IngestConfig;
use crate::db::models::{Component, Distribution, IncomingDirectory, Vendor};
use crate::error::{Error, Result};
use crate::lock::IncomingLock;
use crate::poll::Sleeper;
use crate::process::CommandRunner;
use crate::tools::{self, RpmTools, RpmTree};
use rusqlite::Connection;
use scanner::Route;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Outcome of one batch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// `.changes` files published into every target component
    pub changes_published: Vec<PathBuf>,
    /// RPM files copied into the pool and linked
    pub rpms_published: Vec<PathBuf>,
    /// Items that failed and were left in place
    pub failed: Vec<PathBuf>,
    /// Entries that were not recognized
    pub skipped: Vec<PathBuf>,
}

impl IngestReport {
    /// One-line summary for the command output
    pub fn summary(&self) -> String {
        format!(
            "{} changes file(s) and {} rpm(s) published, {} failed, {} skipped",
            self.changes_published.len(),
            self.rpms_published.len(),
            self.failed.len(),
            self.skipped.len()
        )
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Record the outcome of one item; fatal errors end the batch
    ///
    /// `Ok(false)` is a failure that was already reported where it happened.
    fn settle(&mut self, kind: ItemKind, path: &Path, outcome: Result<bool>) -> Result<()> {
        match outcome {
            Ok(true) => match kind {
                ItemKind::Changes => self.changes_published.push(path.to_path_buf()),
                ItemKind::Rpm => self.rpms_published.push(path.to_path_buf()),
            },
            Ok(false) => self.failed.push(path.to_path_buf()),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!("{}: {}", path.display(), e);
                self.failed.push(path.to_path_buf());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum ItemKind {
    Changes,
    Rpm,
}

/// Drives one ingestion batch
///
/// `conn` may be a transaction; dry-run batches are run inside one that is
/// rolled back afterwards.
pub struct Ingestor<'a> {
    conn: &'a Connection,
    config: &'a IngestConfig,
    runner: &'a dyn CommandRunner,
    sleeper: &'a dyn Sleeper,
}

impl<'a> Ingestor<'a> {
    pub fn new(
        conn: &'a Connection,
        config: &'a IngestConfig,
        runner: &'a dyn CommandRunner,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            conn,
            config,
            runner,
            sleeper,
        }
    }

    /// Process every enabled incoming directory
    pub fn run(&self) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        self.prepare_rpm_tree()?;

        for incoming in IncomingDirectory::list_enabled(self.conn)? {
            self.process_incoming(&incoming, &mut report)?;
        }

        self.regenerate_rpm_metadata()?;
        self.relabel()?;

        info!("Ingestion finished: {}", report.summary());
        Ok(report)
    }

    fn rpm_tree(&self) -> Option<RpmTree> {
        self.config.rpm_basedir.as_deref().map(RpmTree::new)
    }

    fn rpm_tools(&self) -> RpmTools {
        RpmTools::new(&self.config.tools.rpm, &self.config.tools.createrepo)
    }

    /// Components of every RPM-vendor distribution, each once, by name
    fn rpm_components(&self) -> Result<Vec<Component>> {
        let mut seen = BTreeSet::new();
        let mut components = Vec::new();
        for dist in Distribution::list_by_vendors(self.conn, &Vendor::RPM)? {
            for component in dist.components(self.conn)? {
                if seen.insert(component.name.clone()) {
                    components.push(component);
                }
            }
        }
        components.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(components)
    }

    /// Make sure the pool and every component directory exist
    fn prepare_rpm_tree(&self) -> Result<()> {
        let Some(tree) = self.rpm_tree() else {
            return Ok(());
        };

        let mut dirs = vec![tree.pool_dir()];
        dirs.extend(
            self.rpm_components()?
                .iter()
                .map(|c| tree.component_dir(&c.name)),
        );

        // A missing directory only fails the RPM items that need it
        for dir in dirs {
            if let Err(e) = fsops::ensure_dir(self.config.dry_run, &dir) {
                error!("{}", e);
            }
        }
        Ok(())
    }

    /// Run createrepo once per component after the whole batch
    fn regenerate_rpm_metadata(&self) -> Result<()> {
        let Some(tree) = self.rpm_tree() else {
            return Ok(());
        };

        let tools = self.rpm_tools();
        for component in self.rpm_components()? {
            let argv = tools.createrepo(&tree.component_dir(&component.name));
            let output = self.runner.run(&argv)?;
            if !output.success() {
                output.log_failure(&format!("createrepo failed for {}", component.name));
            }
        }
        Ok(())
    }

    /// Restore SELinux contexts on the repository trees
    fn relabel(&self) -> Result<()> {
        if !self.config.selinux {
            return Ok(());
        }

        for base in [&self.config.apt_basedir, &self.config.rpm_basedir]
            .into_iter()
            .flatten()
        {
            self.runner
                .fire_and_forget(&tools::restorecon(&self.config.tools.restorecon, base))?;
        }
        Ok(())
    }

    /// Drain one incoming directory under its lock
    fn process_incoming(
        &self,
        incoming: &IncomingDirectory,
        report: &mut IngestReport,
    ) -> Result<()> {
        let location = Path::new(&incoming.location);
        if !location.exists() {
            error!("{}: No such directory.", incoming.location);
            report.skipped.push(location.to_path_buf());
            return Ok(());
        }
        if !location.is_dir() {
            error!("{}: Not a directory.", incoming.location);
            report.skipped.push(location.to_path_buf());
            return Ok(());
        }

        let _lock = if self.config.dry_run {
            None
        } else {
            match IncomingLock::try_acquire(&self.config.lock_dir, &incoming.location) {
                Ok(Some(lock)) => Some(lock),
                Ok(None) => {
                    warn!("{}, skipping", Error::Locked(incoming.location.clone()));
                    report.skipped.push(location.to_path_buf());
                    return Ok(());
                }
                Err(e) => {
                    error!("{}: {}", incoming.location, e);
                    report.skipped.push(location.to_path_buf());
                    return Ok(());
                }
            }
        };

        info!("Processing incoming directory {}", incoming.location);
        let dists = Distribution::list_all(self.conn)?;

        let entries = match scanner::list_sorted(location) {
            Ok(entries) => entries,
            Err(e) => {
                error!("{}", e);
                report.skipped.push(location.to_path_buf());
                return Ok(());
            }
        };

        for path in entries {
            let route = scanner::classify(&path, path.is_dir(), &dists);
            match route {
                Route::Debian { dist, arch } => {
                    self.process_debian_dir(&path, dist, arch.as_deref(), report)?
                }
                Route::RpmDirectory { dist, arch } => {
                    self.process_rpm_dir(&path, dist, arch.as_deref(), report)?
                }
                Route::RpmFile => self.process_rpm_upload(&path, report)?,
                Route::Unknown(reason) => {
                    warn!("Skipping {}: {}", path.display(), reason);
                    report.skipped.push(path);
                }
            }
        }

        Ok(())
    }
}
