// src/lock.rs

//! Advisory lock per incoming directory
//!
//! Two batches must never drain the same incoming directory at once. Each
//! directory maps to a lock file under the configured lock directory; the
//! batch holds `flock(LOCK_EX)` on it while processing that directory and
//! skips directories another process is working on.
//!
//! ```ignore
//! if let Some(_lock) = IncomingLock::try_acquire(&lock_dir, "/srv/incoming")? {
//!     // ... drain the directory ...
//! } // released on drop
//! ```

use crate::error::{Error, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive lock on one incoming directory
pub struct IncomingLock {
    /// The lock file handle (kept open to maintain the lock)
    file: File,
    path: PathBuf,
}

impl IncomingLock {
    /// Lock file used for `location`
    ///
    /// The location is flattened into a single file name: `/srv/incoming`
    /// becomes `srv_incoming.lock`.
    pub fn lock_path(lock_dir: &Path, location: &str) -> PathBuf {
        let flattened: String = location
            .trim_matches('/')
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        let name = if flattened.is_empty() { "root".to_string() } else { flattened };
        lock_dir.join(format!("{}.lock", name))
    }

    /// Try to take the lock without blocking
    ///
    /// Returns `Ok(None)` when another process holds it.
    pub fn try_acquire(lock_dir: &Path, location: &str) -> Result<Option<Self>> {
        let path = Self::lock_path(lock_dir, location);

        fs::create_dir_all(lock_dir).map_err(|e| {
            Error::IoError(format!(
                "Failed to create lock directory {}: {}",
                lock_dir.display(),
                e
            ))
        })?;

        let file = File::create(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!("Acquired incoming lock at {:?}", path);
                Ok(Some(Self { file, path }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                debug!("Incoming lock already held at {:?}", path);
                Ok(None)
            }
            Err(e) => Err(Error::IoError(format!(
                "Failed to lock {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for IncomingLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        debug!("Released incoming lock at {:?}", self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_is_flat() {
        let dir = Path::new("/run/repomgr");
        assert_eq!(
            IncomingLock::lock_path(dir, "/srv/incoming/"),
            PathBuf::from("/run/repomgr/srv_incoming.lock")
        );
        assert_eq!(
            IncomingLock::lock_path(dir, "/"),
            PathBuf::from("/run/repomgr/root.lock")
        );
    }

    #[test]
    fn test_second_acquire_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let lock_dir = temp_dir.path().join("locks");

        let lock = IncomingLock::try_acquire(&lock_dir, "/srv/incoming")
            .unwrap()
            .unwrap();
        assert!(lock.path().exists());

        // flock locks are per open file description, so a second handle in
        // the same process conflicts just like another process would
        assert!(
            IncomingLock::try_acquire(&lock_dir, "/srv/incoming")
                .unwrap()
                .is_none()
        );

        // Other directories are independent
        assert!(
            IncomingLock::try_acquire(&lock_dir, "/srv/other")
                .unwrap()
                .is_some()
        );

        drop(lock);
        assert!(
            IncomingLock::try_acquire(&lock_dir, "/srv/incoming")
                .unwrap()
                .is_some()
        );
    }
}
