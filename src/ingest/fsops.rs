// src/ingest/fsops.rs

//! Filesystem mutations performed by the pipelines
//!
//! Every helper takes the dry-run flag explicitly and does nothing but log
//! when it is set, so a rehearsal leaves the tree untouched.

use crate::config::IngestConfig;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Delete an uploaded file after it was published
///
/// Suppressed by `--norm` and by dry-run. A file that is already gone is
/// not an error.
pub fn remove_upload(config: &IngestConfig, path: &Path) -> Result<()> {
    if config.no_remove {
        debug!("Keeping {} (no-remove)", path.display());
        return Ok(());
    }
    remove_published(config.dry_run, path)
}

/// Delete a file or symlink from the repository tree, best effort
///
/// Missing entries are skipped and other failures are only logged: the
/// sweep must never block the publish that follows it.
pub fn remove_published(dry_run: bool, path: &Path) -> Result<()> {
    // symlink_metadata so that dangling links are removed too
    if fs::symlink_metadata(path).is_err() {
        debug!("{} already absent", path.display());
        return Ok(());
    }

    info!("Removing {}", path.display());
    if dry_run {
        return Ok(());
    }

    if let Err(e) = fs::remove_file(path) {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
    Ok(())
}

/// Copy an upload into the storage pool, overwriting an older copy
pub fn copy_into_pool(dry_run: bool, source: &Path, dest: &Path) -> Result<()> {
    info!("Copying {} to {}", source.display(), dest.display());
    if dry_run {
        return Ok(());
    }

    fs::copy(source, dest).map_err(|e| {
        Error::StorageCopy(format!(
            "{} -> {}: {}",
            source.display(),
            dest.display(),
            e
        ))
    })?;
    Ok(())
}

/// Create `link` pointing at `target`
///
/// An existing entry at `link` is a conflict; it is never replaced.
pub fn link_into_component(dry_run: bool, target: &Path, link: &Path) -> Result<()> {
    if fs::symlink_metadata(link).is_ok() {
        return Err(Error::LinkConflict(link.display().to_string()));
    }

    info!("Linking {} -> {}", link.display(), target.display());
    if dry_run {
        return Ok(());
    }

    std::os::unix::fs::symlink(target, link).map_err(|e| {
        Error::IoError(format!("Failed to create symlink {}: {}", link.display(), e))
    })
}

/// Create a directory and its parents
pub fn ensure_dir(dry_run: bool, dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    debug!("Creating directory {}", dir.display());
    if dry_run {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| {
        Error::IoError(format!("Failed to create directory {}: {}", dir.display(), e))
    })
}
