// src/packages/deb.rs

//! Debian binary package filenames (`name_version_arch.deb`)

use crate::error::{Error, Result};

/// Identity of a `.deb` as encoded in its filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebFilename {
    pub name: String,
    pub version: String,
    pub arch: String,
}

impl DebFilename {
    /// Split `name_version_arch.deb`
    ///
    /// Underscores are not legal in Debian package names or versions, but
    /// when they do appear the name absorbs them, matching how a greedy
    /// `(.*)_(.*)_(.*)\.deb` pattern splits.
    pub fn parse(filename: &str) -> Result<Self> {
        let stem = filename
            .strip_suffix(".deb")
            .ok_or_else(|| Error::ParseError(format!("Not a .deb filename: {}", filename)))?;

        let mut parts = stem.rsplitn(3, '_');
        let (Some(arch), Some(version), Some(name)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::ParseError(format!(
                "Expected name_version_arch.deb, got {}",
                filename
            )));
        };

        if name.is_empty() || version.is_empty() || arch.is_empty() {
            return Err(Error::ParseError(format!(
                "Expected name_version_arch.deb, got {}",
                filename
            )));
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            arch: arch.to_string(),
        })
    }

    /// Whether the filename targets `arch` (`..._<arch>.deb`)
    pub fn is_for_arch(filename: &str, arch: &str) -> bool {
        filename.ends_with(&format!("_{}.deb", arch))
    }
}

/// Debian source version without the trailing `-revision`
///
/// `1.0-1` becomes `1.0`, `2:1.2-3-4` becomes `2:1.2-3`; a native version
/// without a revision is returned unchanged.
pub fn upstream_version(version: &str) -> &str {
    version.rsplit_once('-').map_or(version, |(upstream, _)| upstream)
}
