// src/config.rs

//! Configuration for repomgr
//!
//! Supports a TOML configuration file with the following sections:
//! - [database] - Bookkeeping database location
//! - [apt] - reprepro base directory and program
//! - [rpm] - RPM tree base directory, rpm and createrepo programs
//! - [ingest] - Upload retry policy, lock directory, SELinux relabeling
//!
//! Runtime flags from the command line are merged with the file into an
//! immutable [`IngestConfig`] that is passed to every pipeline stage.

use crate::error::{Error, Result};
use crate::poll::BoundedPoll;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/repomgr/repomgr.toml";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseSection,

    /// Debian repository settings
    #[serde(default)]
    pub apt: AptSection,

    /// RPM repository settings
    #[serde(default)]
    pub rpm: RpmSection,

    /// Ingestion behaviour
    #[serde(default)]
    pub ingest: IngestSection,
}

/// Database configuration section
#[derive(Debug, Deserialize)]
pub struct DatabaseSection {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Debian repository section
#[derive(Debug, Deserialize)]
pub struct AptSection {
    /// reprepro base directory; Debian publication is disabled without it
    #[serde(default)]
    pub basedir: Option<PathBuf>,

    #[serde(default = "default_reprepro")]
    pub reprepro: String,
}

impl Default for AptSection {
    fn default() -> Self {
        Self {
            basedir: None,
            reprepro: default_reprepro(),
        }
    }
}

/// RPM repository section
#[derive(Debug, Deserialize)]
pub struct RpmSection {
    /// Root of the RPM tree (`rpms/` pool plus one directory per component)
    #[serde(default)]
    pub basedir: Option<PathBuf>,

    #[serde(default = "default_rpm")]
    pub rpm: String,

    #[serde(default = "default_createrepo")]
    pub createrepo: String,
}

impl Default for RpmSection {
    fn default() -> Self {
        Self {
            basedir: None,
            rpm: default_rpm(),
            createrepo: default_createrepo(),
        }
    }
}

/// Ingestion section
#[derive(Debug, Deserialize)]
pub struct IngestSection {
    /// Extra existence checks for in-flight uploads
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Seconds between existence checks
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,

    /// Directory holding the per-incoming-directory lock files
    #[serde(default = "default_lock_dir")]
    pub lock_dir: PathBuf,

    /// Run restorecon over the repository trees after each batch
    #[serde(default)]
    pub selinux: bool,

    #[serde(default = "default_restorecon")]
    pub restorecon: String,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_interval_secs: default_retry_interval(),
            lock_dir: default_lock_dir(),
            selinux: false,
            restorecon: default_restorecon(),
        }
    }
}

fn default_db_path() -> String {
    "/var/lib/repomgr/repomgr.db".to_string()
}

fn default_reprepro() -> String {
    "reprepro".to_string()
}

fn default_rpm() -> String {
    "rpm".to_string()
}

fn default_createrepo() -> String {
    "createrepo".to_string()
}

fn default_restorecon() -> String {
    "restorecon".to_string()
}

fn default_retry_attempts() -> u32 {
    4
}

fn default_retry_interval() -> u64 {
    5
}

fn default_lock_dir() -> PathBuf {
    PathBuf::from("/run/repomgr")
}

impl Settings {
    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_toml_str(&content)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(Error::ConfigError("database.path must not be empty".to_string()));
        }

        for (key, dir) in [("apt.basedir", &self.apt.basedir), ("rpm.basedir", &self.rpm.basedir)] {
            if let Some(dir) = dir
                && !dir.is_absolute()
            {
                return Err(Error::ConfigError(format!(
                    "{key} must be an absolute path, got {}",
                    dir.display()
                )));
            }
        }

        for (key, program) in [
            ("apt.reprepro", &self.apt.reprepro),
            ("rpm.rpm", &self.rpm.rpm),
            ("rpm.createrepo", &self.rpm.createrepo),
            ("ingest.restorecon", &self.ingest.restorecon),
        ] {
            if program.trim().is_empty() {
                return Err(Error::ConfigError(format!("{key} must not be empty")));
            }
        }

        Ok(())
    }
}

/// Flags given on the command line for one batch
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Rehearse without touching the filesystem or running tools
    pub dry_run: bool,
    /// Echo every external command line
    pub verbose: bool,
    /// Keep uploaded files after publishing them
    pub no_remove: bool,
    /// Packages to remove before adding their new version
    pub prerm: Vec<String>,
}

impl IngestOptions {
    /// Split a comma-separated package list, ignoring empty entries
    pub fn parse_prerm(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// External program names
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub reprepro: String,
    pub rpm: String,
    pub createrepo: String,
    pub restorecon: String,
}

/// Immutable configuration of one ingestion batch
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub dry_run: bool,
    pub verbose: bool,
    pub no_remove: bool,
    pub prerm: Vec<String>,
    pub apt_basedir: Option<PathBuf>,
    pub rpm_basedir: Option<PathBuf>,
    pub tools: ToolPaths,
    pub upload_poll: BoundedPoll,
    pub lock_dir: PathBuf,
    pub selinux: bool,
}

impl IngestConfig {
    /// Merge file settings with command line flags
    pub fn new(settings: &Settings, options: IngestOptions) -> Self {
        Self {
            dry_run: options.dry_run,
            verbose: options.verbose,
            no_remove: options.no_remove,
            prerm: options.prerm,
            apt_basedir: settings.apt.basedir.clone(),
            rpm_basedir: settings.rpm.basedir.clone(),
            tools: ToolPaths {
                reprepro: settings.apt.reprepro.clone(),
                rpm: settings.rpm.rpm.clone(),
                createrepo: settings.rpm.createrepo.clone(),
                restorecon: settings.ingest.restorecon.clone(),
            },
            upload_poll: BoundedPoll::new(
                settings.ingest.retry_attempts + 1,
                Duration::from_secs(settings.ingest.retry_interval_secs),
            ),
            lock_dir: settings.ingest.lock_dir.clone(),
            selinux: settings.ingest.selinux,
        }
    }

    /// Whether `name` was named on the command line for pre-removal
    pub fn is_prerm(&self, name: &str) -> bool {
        self.prerm.iter().any(|p| p == name)
    }
}
