// src/ingest/rpm.rs

//! RPM pipeline: signature check, pool copy and per-component symlinks
//!
//! RPMs arrive either as bare files at the top of an incoming directory
//! (identified by filename) or inside a `<dist>[-<arch>]` directory
//! (identified with `rpm -qpi`). Each file is checked, copied into the
//! flat pool under its canonical name and linked into every target
//! component; createrepo runs once after the whole batch.

use super::components::{self, ArchFilter};
use super::{IngestReport, Ingestor, ItemKind, fsops, removal, scanner};
use crate::db::models::{
    BinaryKey, BinaryPackage, Distribution, Package, SourcePackage, VendorFamily,
    component_names,
};
use crate::error::{Error, Result};
use crate::packages::rpm::DEFAULT_ARCH;
use crate::packages::{RpmIdentity, RpmQueryInfo};
use crate::tools::RpmTree;
use std::path::Path;
use tracing::{debug, error, info, warn};

impl Ingestor<'_> {
    /// A bare `.rpm` at the top of an incoming directory
    pub(super) fn process_rpm_upload(&self, path: &Path, report: &mut IngestReport) -> Result<()> {
        let outcome = self.identify_by_filename(path).and_then(|(identity, dist)| {
            self.process_rpm(path, identity, dist)
        });
        report.settle(ItemKind::Rpm, path, outcome)
    }

    /// Every `.rpm` inside a distribution directory
    pub(super) fn process_rpm_dir(
        &self,
        dir: &Path,
        dist: Distribution,
        arch: Option<&str>,
        report: &mut IngestReport,
    ) -> Result<()> {
        let uploads = match scanner::files_with_extension(dir, "rpm") {
            Ok(uploads) => uploads,
            Err(e) => {
                error!("{}", e);
                report.skipped.push(dir.to_path_buf());
                return Ok(());
            }
        };

        for path in uploads {
            let outcome = self
                .identify_by_query(&path, &dist, arch)
                .and_then(|identity| self.process_rpm(&path, identity, dist.clone()));
            report.settle(ItemKind::Rpm, &path, outcome)?;
        }
        Ok(())
    }

    fn identify_by_filename(&self, path: &Path) -> Result<(RpmIdentity, Distribution)> {
        let filename = file_name(path)?;
        let identity = RpmIdentity::from_filename(filename)?;
        let dist = Distribution::find_by_name(self.conn, &identity.dist)?.ok_or_else(|| {
            Error::NotFound(format!("{}: unknown distribution {}", filename, identity.dist))
        })?;
        if dist.vendor.family() != VendorFamily::Rpm {
            return Err(Error::NotFound(format!(
                "{}: {} is not an RPM distribution",
                filename, dist.name
            )));
        }
        Ok((identity, dist))
    }

    /// Ask rpm for the package metadata, falling back to the filename
    fn identify_by_query(
        &self,
        path: &Path,
        dist: &Distribution,
        dir_arch: Option<&str>,
    ) -> Result<RpmIdentity> {
        let output = self
            .runner
            .run(&self.rpm_tools().query_info(path))?;

        let parsed = if output.success() {
            RpmQueryInfo::parse(&output.stdout)
        } else {
            Err(Error::ParseError(format!("rpm -qpi exited with {}", output.code)))
        };

        match parsed {
            Ok(mut info) => {
                if info.arch.is_none() {
                    info.arch = Some(dir_arch.unwrap_or(DEFAULT_ARCH).to_string());
                }
                Ok(RpmIdentity::from_query(info, &dist.name))
            }
            Err(e) => {
                debug!("{}: {}; using the file name", path.display(), e);
                let mut identity = RpmIdentity::from_filename(file_name(path)?)?;
                identity.dist = dist.name.clone();
                Ok(identity)
            }
        }
    }

    /// Publish one RPM; returns whether it was linked everywhere
    fn process_rpm(&self, path: &Path, identity: RpmIdentity, dist: Distribution) -> Result<bool> {
        let basedir = self
            .config
            .rpm_basedir
            .as_deref()
            .ok_or_else(|| Error::ConfigError("rpm.basedir is not configured".to_string()))?;
        let tree = RpmTree::new(basedir);
        let target = identity.canonical_filename();
        info!("{}: {} for {}", path.display(), target, dist.name);

        let mut package = self.owning_package(&identity, &dist)?;
        package.touch(self.conn)?;

        if removal::should_remove(&package, self.config) {
            removal::purge(self.conn, self.config, &tree, &package)?;
        }

        let output = self.runner.run(&self.rpm_tools().checksig(path))?;
        if !output.success() {
            output.log_failure(&format!("{}: checksig failed", path.display()));
            return Err(Error::SignatureInvalid(path.display().to_string()));
        }

        let pooled = tree.pool_path(&target);
        fsops::copy_into_pool(self.config.dry_run, path, &pooled)?;
        fsops::remove_upload(self.config, path)?;

        let dists = if package.all_distributions {
            Distribution::list_by_vendors(self.conn, &[dist.vendor])?
        } else {
            vec![dist]
        };

        let mut all_linked = true;
        for mut target_dist in dists {
            target_dist.touch(self.conn)?;
            if !self.publish_rpm(&tree, &identity, &package, &target_dist, &pooled)? {
                all_linked = false;
            }
        }

        Ok(all_linked)
    }

    /// Record and link one RPM into one distribution
    fn publish_rpm(
        &self,
        tree: &RpmTree,
        identity: &RpmIdentity,
        package: &Package,
        dist: &Distribution,
        pooled: &Path,
    ) -> Result<bool> {
        let targets = components::resolve(self.conn, package, dist, ArchFilter::Rpm(&identity.arch))?;
        if targets.is_empty() {
            warn!(
                "{}: no {} components for {}",
                dist.name, identity.arch, identity.name
            );
            return Ok(false);
        }
        if self.config.verbose {
            println!("{}: {}", dist.name, component_names(&targets));
        }

        let version = identity.full_version();
        if identity.is_source() {
            SourcePackage::record(self.conn, package.id()?, dist.id()?, &version, &targets)?;
        } else {
            let key = BinaryKey {
                package_id: package.id()?,
                name: &identity.name,
                distribution_id: dist.id()?,
                arch: &identity.arch,
            };
            BinaryPackage::record(self.conn, key, &version, &targets)?;
        }

        let filename = identity.filename_for(&dist.name);
        let mut all_linked = true;
        for component in &targets {
            let link = tree.link_path(&component.name, &filename);
            if let Err(e) = fsops::link_into_component(self.config.dry_run, pooled, &link) {
                error!("{}: {}", component.name, e);
                all_linked = false;
            }
        }

        Ok(all_linked)
    }

    /// Find the package an RPM belongs to
    ///
    /// Existing publications win, preferring the same distribution (and,
    /// for binaries, the same arch); a new package is created otherwise.
    fn owning_package(&self, identity: &RpmIdentity, dist: &Distribution) -> Result<Package> {
        let dist_id = dist.id()?;

        let package_id = if identity.is_source() {
            let rows = SourcePackage::find_by_package_name(self.conn, &identity.name)?;
            rows.iter()
                .find(|s| s.distribution_id == dist_id)
                .or(rows.first())
                .map(|s| s.package_id)
        } else {
            let rows = BinaryPackage::find_by_name(self.conn, &identity.name)?;
            rows.iter()
                .find(|b| b.distribution_id == dist_id && b.arch == identity.arch)
                .or_else(|| rows.iter().find(|b| b.distribution_id == dist_id))
                .or(rows.first())
                .map(|b| b.package_id)
        };

        if let Some(id) = package_id
            && let Some(package) = Package::find_by_id(self.conn, id)?
        {
            return Ok(package);
        }

        Package::get_or_create(self.conn, &identity.name)
    }
}

fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::ParseError(format!("Bad file name: {}", path.display())))
}
