// src/ingest/scanner.rs

//! Classification of incoming directory entries
//!
//! Top-level entries of an incoming directory are either distribution
//! directories named `<distribution>[-<arch>]` or bare `.rpm` files.
//! Classification is pure: it only looks at names and the known
//! distributions, so the dispatcher can be tested without a filesystem.

use crate::db::models::{Distribution, VendorFamily};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Where an incoming entry goes
#[derive(Debug, Clone)]
pub enum Route {
    /// `<dist>-<arch>` directory of a Debian-family distribution
    Debian {
        dist: Distribution,
        arch: Option<String>,
    },
    /// `<dist>[-<arch>]` directory of an RPM-family distribution
    RpmDirectory {
        dist: Distribution,
        arch: Option<String>,
    },
    /// Bare `.rpm` file; its distribution comes from the filename
    RpmFile,
    /// Not ours; reported and left alone
    Unknown(String),
}

/// Entries of `dir`, sorted by file name
pub fn list_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {}", dir.display(), e)))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

/// Files in `dir` with the given extension, sorted by file name
pub fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    Ok(list_sorted(dir)?
        .into_iter()
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == extension))
        .collect())
}

/// Split a directory name into a known distribution and optional arch
///
/// The whole name is tried first so distributions containing a hyphen
/// still match; otherwise the text after the last hyphen is the arch.
pub fn split_dir_name<'a>(
    name: &'a str,
    dists: &'a [Distribution],
) -> Option<(&'a Distribution, Option<&'a str>)> {
    let find = |dist_name: &str| dists.iter().find(|d| d.name == dist_name);

    if let Some(dist) = find(name) {
        return Some((dist, None));
    }

    let (dist_name, arch) = name.rsplit_once('-')?;
    let dist = find(dist_name)?;
    Some((dist, (!arch.is_empty()).then_some(arch)))
}

/// Classify one top-level entry
pub fn classify(path: &Path, is_dir: bool, dists: &[Distribution]) -> Route {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return Route::Unknown("file name is not valid UTF-8".to_string());
    };

    if !is_dir {
        return if name.ends_with(".rpm") {
            Route::RpmFile
        } else {
            Route::Unknown("not a distribution directory or rpm file".to_string())
        };
    }

    let Some((dist, arch)) = split_dir_name(name, dists) else {
        return Route::Unknown("no distribution of that name".to_string());
    };

    let dist = dist.clone();
    let arch = arch.map(str::to_string);
    match dist.vendor.family() {
        VendorFamily::Debian => Route::Debian { dist, arch },
        VendorFamily::Rpm => Route::RpmDirectory { dist, arch },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Vendor;

    fn dists() -> Vec<Distribution> {
        let mut out = Vec::new();
        for (id, (name, vendor)) in [
            ("bookworm", Vendor::Debian),
            ("jammy", Vendor::Ubuntu),
            ("el9", Vendor::RedHat),
            ("fc-rawhide", Vendor::Fedora),
        ]
        .into_iter()
        .enumerate()
        {
            let mut dist = Distribution::new(name.to_string(), vendor);
            dist.id = Some(id as i64 + 1);
            out.push(dist);
        }
        out
    }

    #[test]
    fn test_split_dir_name() {
        let dists = dists();

        let (dist, arch) = split_dir_name("bookworm-amd64", &dists).unwrap();
        assert_eq!(dist.name, "bookworm");
        assert_eq!(arch, Some("amd64"));

        let (dist, arch) = split_dir_name("fc-rawhide", &dists).unwrap();
        assert_eq!(dist.name, "fc-rawhide");
        assert_eq!(arch, None);

        let (dist, arch) = split_dir_name("fc-rawhide-aarch64", &dists).unwrap();
        assert_eq!(dist.name, "fc-rawhide");
        assert_eq!(arch, Some("aarch64"));

        assert!(split_dir_name("sid-amd64", &dists).is_none());
        assert!(split_dir_name("amd64", &dists).is_none());
    }

    #[test]
    fn test_classify_routes_by_vendor() {
        let dists = dists();

        assert!(matches!(
            classify(Path::new("/in/jammy-arm64"), true, &dists),
            Route::Debian { arch: Some(ref a), .. } if a == "arm64"
        ));
        assert!(matches!(
            classify(Path::new("/in/el9"), true, &dists),
            Route::RpmDirectory { arch: None, .. }
        ));
        assert!(matches!(
            classify(Path::new("/in/foo-2.0-1.el9.x86_64.rpm"), false, &dists),
            Route::RpmFile
        ));
        assert!(matches!(
            classify(Path::new("/in/README"), false, &dists),
            Route::Unknown(_)
        ));
        assert!(matches!(
            classify(Path::new("/in/sid-amd64"), true, &dists),
            Route::Unknown(_)
        ));
        // A directory that happens to end in .rpm is still a directory
        assert!(matches!(
            classify(Path::new("/in/stuff.rpm"), true, &dists),
            Route::Unknown(_)
        ));
    }

    #[test]
    fn test_listing_is_sorted() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        for name in ["b.changes", "a.changes", "c.deb"] {
            fs::write(temp_dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(temp_dir.path().join("d.changes")).unwrap();

        let changes = files_with_extension(temp_dir.path(), "changes").unwrap();
        let names: Vec<_> = changes
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.changes", "b.changes"]);
    }
}
