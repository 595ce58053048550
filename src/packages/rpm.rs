// src/packages/rpm.rs

//! RPM package identification
//!
//! An incoming RPM is identified either from its filename
//! (`name-version-release.dist.arch.rpm`) or from the `key: value` lines
//! printed by `rpm -qpi`. Both paths produce an [`RpmIdentity`], which also
//! yields the canonical filename used in the storage pool and for the
//! per-component symlinks.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Architecture assumed when the query output does not name one
pub const DEFAULT_ARCH: &str = "x86_64";

static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>[^/]*)-(?P<version>[^-/]*)-(?P<release>[^-/]*)\.(?P<dist>[^./]*)\.(?P<arch>[^/]*)\.rpm$",
    )
    .expect("valid rpm filename regex")
});

static QUERY_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<key>[a-zA-Z ]*[a-zA-Z])[ ]*: (?P<value>.*)$").expect("valid rpm query regex")
});

/// Name, version, release, distribution tag and architecture of an RPM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpmIdentity {
    pub name: String,
    pub version: String,
    pub release: String,
    pub dist: String,
    pub arch: String,
}

impl RpmIdentity {
    /// Identify a package from its filename
    pub fn from_filename(filename: &str) -> Result<Self> {
        let caps = FILENAME_RE.captures(filename).ok_or_else(|| {
            Error::ParseError(format!(
                "Expected name-version-release.dist.arch.rpm, got {}",
                filename
            ))
        })?;

        let field = |key: &str| caps.name(key).map_or("", |m| m.as_str()).to_string();
        let identity = Self {
            name: field("name"),
            version: field("version"),
            release: field("release"),
            dist: field("dist"),
            arch: field("arch"),
        };

        if identity.name.is_empty() || identity.version.is_empty() || identity.arch.is_empty() {
            return Err(Error::ParseError(format!(
                "Incomplete rpm filename: {}",
                filename
            )));
        }

        Ok(identity)
    }

    /// Identify a package from `rpm -qpi` metadata and the directory's dist
    ///
    /// A release that already carries the `.<dist>` tag keeps it only once.
    pub fn from_query(info: RpmQueryInfo, dist: &str) -> Self {
        let suffix = format!(".{}", dist);
        let release = match info.release.strip_suffix(&suffix) {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => info.release,
        };

        Self {
            name: info.name,
            version: info.version,
            release,
            dist: dist.to_string(),
            arch: info.arch.unwrap_or_else(|| DEFAULT_ARCH.to_string()),
        }
    }

    /// `name-version-release.dist.arch.rpm`
    pub fn canonical_filename(&self) -> String {
        self.filename_for(&self.dist)
    }

    /// Link name of this package inside a component of `dist`
    ///
    /// Equal to [`Self::canonical_filename`] for the package's own
    /// distribution.
    pub fn filename_for(&self, dist: &str) -> String {
        format!(
            "{}-{}-{}.{}.{}.rpm",
            self.name, self.version, self.release, dist, self.arch
        )
    }

    /// Version recorded in bookkeeping (`version-release`)
    pub fn full_version(&self) -> String {
        format!("{}-{}", self.version, self.release)
    }

    /// Source RPMs carry the `src` architecture
    pub fn is_source(&self) -> bool {
        self.arch == "src"
    }
}

/// Fields of interest from `rpm -qpi` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpmQueryInfo {
    pub name: String,
    pub version: String,
    pub release: String,
    pub arch: Option<String>,
}

impl RpmQueryInfo {
    /// Parse `rpm -qpi` output
    ///
    /// Keys are matched case-insensitively and parsing stops at the
    /// `Description` line, since the free-form text after it may contain
    /// anything. Lines that are not `key: value` are logged and skipped.
    pub fn parse(output: &str) -> Result<Self> {
        let mut name = None;
        let mut version = None;
        let mut release = None;
        let mut arch = None;

        for line in output.lines() {
            if line.starts_with("Description") {
                break;
            }

            let Some(caps) = QUERY_LINE_RE.captures(line) else {
                if !line.trim().is_empty() {
                    warn!("Can't parse rpm query line: {}", line);
                }
                continue;
            };

            let key = caps["key"].to_ascii_lowercase();
            let value = caps["value"].trim().to_string();
            match key.as_str() {
                "name" => name = Some(value),
                "version" => version = Some(value),
                "release" => release = Some(value),
                "architecture" => arch = Some(value),
                _ => debug!("Ignoring rpm query field {}", key),
            }
        }

        match (name, version, release) {
            (Some(name), Some(version), Some(release))
                if !name.is_empty() && !version.is_empty() && !release.is_empty() =>
            {
                Ok(Self {
                    name,
                    version,
                    release,
                    arch: arch.filter(|a| !a.is_empty()),
                })
            }
            _ => Err(Error::ParseError(
                "rpm query output lacks name, version or release".to_string(),
            )),
        }
    }
}
