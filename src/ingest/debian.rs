// src/ingest/debian.rs

//! Debian pipeline: `.changes` uploads published with reprepro
//!
//! Per changes file: wait for the upload to be complete, optionally remove
//! the old source, `include` (amd64) or `includedeb` (other architectures)
//! into every target component, record what succeeded, and delete the
//! upload only if every invocation succeeded. A failed upload stays in
//! place and is retried in full on the next run.

use super::components::{self, ArchFilter};
use super::{IngestReport, Ingestor, ItemKind, fsops, scanner};
use crate::db::models::{
    BinaryKey, BinaryPackage, Component, Distribution, Package, SourcePackage, component_names,
};
use crate::error::{Error, Result};
use crate::packages::{ChangesFile, DebFilename, upstream_version};
use crate::tools::Reprepro;
use std::path::Path;
use tracing::{error, info, warn};

/// Architecture whose uploads carry the source package
const SOURCE_ARCH: &str = "amd64";

impl Ingestor<'_> {
    /// Process every `.changes` file of a `<dist>-<arch>` directory
    pub(super) fn process_debian_dir(
        &self,
        dir: &Path,
        mut dist: Distribution,
        arch: Option<&str>,
        report: &mut IngestReport,
    ) -> Result<()> {
        let Some(arch) = arch else {
            warn!(
                "Skipping {}: Debian directories are named <distribution>-<arch>",
                dir.display()
            );
            report.skipped.push(dir.to_path_buf());
            return Ok(());
        };

        let uploads = match scanner::files_with_extension(dir, "changes") {
            Ok(uploads) => uploads,
            Err(e) => {
                error!("{}", e);
                report.skipped.push(dir.to_path_buf());
                return Ok(());
            }
        };

        for changes in uploads {
            let outcome = self.process_changes(&changes, &mut dist, arch);
            report.settle(ItemKind::Changes, &changes, outcome)?;
        }
        Ok(())
    }

    /// Publish one changes file; `Ok(false)` leaves it for the next run
    fn process_changes(&self, path: &Path, dist: &mut Distribution, arch: &str) -> Result<bool> {
        let basedir = self
            .config
            .apt_basedir
            .as_deref()
            .ok_or_else(|| Error::ConfigError("apt.basedir is not configured".to_string()))?;
        let reprepro = Reprepro::new(&self.config.tools.reprepro, basedir);

        let changes = ChangesFile::parse(path)?;
        let source = changes.source()?;
        info!("{}: {} {} for {}/{}", path.display(), source, changes.version()?, dist.name, arch);

        let mut package = Package::get_or_create(self.conn, source)?;
        package.touch(self.conn)?;
        dist.touch(self.conn)?;

        let targets = components::resolve(self.conn, &package, dist, ArchFilter::Any)?;
        if targets.is_empty() {
            warn!("{}: no components to publish {} into", dist.name, source);
            return Ok(false);
        }
        if self.config.verbose {
            println!("{}: {}", dist.name, component_names(&targets));
        }

        let complete = self.config.upload_poll.wait_until(
            self.sleeper,
            &format!("{}: not all files exist", path.display()),
            || changes.exists(),
        );
        if !complete {
            warn!("{}: upload still incomplete, trying anyway", path.display());
        }

        if self.config.is_prerm(source) || package.remove_on_update {
            self.runner
                .fire_and_forget(&reprepro.removesrc(&dist.name, source))?;
        }

        let all_ok = if arch == SOURCE_ARCH {
            self.include_changes(&reprepro, &changes, &package, dist, &targets)?
        } else {
            self.include_debs(&reprepro, &changes, &package, dist, arch, &targets)?
        };

        if !all_ok {
            warn!("{}: not every publication succeeded, keeping upload", path.display());
            return Ok(false);
        }

        for file in changes.files() {
            fsops::remove_upload(self.config, &changes.file_path(file))?;
        }
        fsops::remove_upload(self.config, path)?;

        Ok(true)
    }

    /// `include` the whole upload into each component
    fn include_changes(
        &self,
        reprepro: &Reprepro,
        changes: &ChangesFile,
        package: &Package,
        dist: &Distribution,
        targets: &[Component],
    ) -> Result<bool> {
        let mut published = Vec::new();

        for component in targets {
            let output = self
                .runner
                .run(&reprepro.include(&component.name, &dist.name, changes.path()))?;
            if output.success() {
                published.push(component.clone());
            } else {
                output.log_failure(&format!(
                    "{}: include into {}/{} failed",
                    changes.path().display(),
                    dist.name,
                    component.name
                ));
            }
        }

        if published.is_empty() {
            return Ok(false);
        }

        let package_id = package.id()?;
        let distribution_id = dist.id()?;
        SourcePackage::record(
            self.conn,
            package_id,
            distribution_id,
            upstream_version(changes.version()?),
            &published,
        )?;

        for deb in changes.binary_packages() {
            let Some(parsed) = parse_deb(deb) else {
                continue;
            };
            let key = BinaryKey {
                package_id,
                name: &parsed.name,
                distribution_id,
                arch: &parsed.arch,
            };
            BinaryPackage::record(self.conn, key, &parsed.version, &published)?;
        }

        Ok(published.len() == targets.len())
    }

    /// `includedeb` every binary for `arch` into each component
    fn include_debs(
        &self,
        reprepro: &Reprepro,
        changes: &ChangesFile,
        package: &Package,
        dist: &Distribution,
        arch: &str,
        targets: &[Component],
    ) -> Result<bool> {
        let debs: Vec<&str> = changes
            .binary_packages()
            .into_iter()
            .filter(|deb| DebFilename::is_for_arch(deb, arch))
            .collect();

        if debs.is_empty() {
            warn!("{}: no {} packages in upload", changes.path().display(), arch);
            return Ok(false);
        }

        let package_id = package.id()?;
        let distribution_id = dist.id()?;
        let mut all_ok = true;

        for deb in debs {
            let deb_path = changes.file_path(deb);
            let mut published = Vec::new();

            for component in targets {
                let output = self
                    .runner
                    .run(&reprepro.includedeb(&component.name, &dist.name, &deb_path))?;
                if output.success() {
                    published.push(component.clone());
                } else {
                    all_ok = false;
                    output.log_failure(&format!(
                        "{}: includedeb into {}/{} failed",
                        deb_path.display(),
                        dist.name,
                        component.name
                    ));
                }
            }

            if published.is_empty() {
                continue;
            }
            let Some(parsed) = parse_deb(deb) else {
                continue;
            };
            let key = BinaryKey {
                package_id,
                name: &parsed.name,
                distribution_id,
                arch: &parsed.arch,
            };
            BinaryPackage::record(self.conn, key, &parsed.version, &published)?;
        }

        Ok(all_ok)
    }
}

/// Parse a referenced `.deb` name; malformed names are logged and skipped
fn parse_deb(filename: &str) -> Option<DebFilename> {
    match DebFilename::parse(filename) {
        Ok(deb) => Some(deb),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}
