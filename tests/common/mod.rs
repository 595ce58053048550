// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use repomgr::config::{IngestConfig, IngestOptions, Settings};
use repomgr::db;
use repomgr::db::models::{Component, Distribution, IncomingDirectory, Package, Vendor};
use repomgr::poll::Sleeper;
use repomgr::process::{CommandOutput, CommandRunner};
use rusqlite::Connection;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Command runner that records every invocation instead of executing it
pub struct RecordingRunner {
    pub calls: RefCell<Vec<Vec<String>>>,
    respond: Box<dyn Fn(&[String]) -> CommandOutput>,
}

impl RecordingRunner {
    /// Every command succeeds with no output
    pub fn new() -> Self {
        Self::responding(|_| CommandOutput::skipped())
    }

    /// Decide the outcome of each command with `respond`
    pub fn responding(respond: impl Fn(&[String]) -> CommandOutput + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    /// Commands for which `fails` holds exit with status 254
    pub fn failing(fails: impl Fn(&[String]) -> bool + 'static) -> Self {
        Self::responding(move |argv| {
            if fails(argv) {
                failure(254, "simulated failure")
            } else {
                CommandOutput::skipped()
            }
        })
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// Recorded calls whose argv contains `word`
    pub fn calls_with(&self, word: &str) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter(|argv| argv.iter().any(|a| a == word))
            .cloned()
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, argv: &[String]) -> repomgr::Result<CommandOutput> {
        self.calls.borrow_mut().push(argv.to_vec());
        Ok((self.respond)(argv))
    }
}

pub fn failure(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        code,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

pub fn output(stdout: &str) -> CommandOutput {
    CommandOutput {
        code: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// Sleeper that returns immediately and counts naps
#[derive(Default)]
pub struct NoopSleeper {
    pub naps: Cell<usize>,
}

impl Sleeper for NoopSleeper {
    fn sleep(&self, _duration: Duration) {
        self.naps.set(self.naps.get() + 1);
    }
}

/// Database, incoming directory and repository trees in one temp dir
pub struct Fixture {
    pub temp_dir: TempDir,
    pub db_path: String,
    pub conn: Connection,
    pub incoming: PathBuf,
    pub apt_base: PathBuf,
    pub rpm_base: PathBuf,
    pub lock_dir: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir
            .path()
            .join("state/repomgr.db")
            .to_str()
            .unwrap()
            .to_string();

        db::init(&db_path).unwrap();
        let conn = db::open(&db_path).unwrap();

        let incoming = temp_dir.path().join("incoming");
        let apt_base = temp_dir.path().join("apt");
        let rpm_base = temp_dir.path().join("rpm");
        let lock_dir = temp_dir.path().join("locks");
        fs::create_dir_all(&incoming).unwrap();
        fs::create_dir_all(&apt_base).unwrap();

        let mut dir = IncomingDirectory::new(incoming.to_str().unwrap().to_string());
        dir.insert(&conn).unwrap();

        Self {
            temp_dir,
            db_path,
            conn,
            incoming,
            apt_base,
            rpm_base,
            lock_dir,
        }
    }

    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.database.path = self.db_path.clone();
        settings.apt.basedir = Some(self.apt_base.clone());
        settings.rpm.basedir = Some(self.rpm_base.clone());
        settings.ingest.lock_dir = self.lock_dir.clone();
        settings
    }

    pub fn config(&self, options: IngestOptions) -> IngestConfig {
        IngestConfig::new(&self.settings(), options)
    }

    /// Create a distribution with the given (enabled) components
    pub fn add_dist(&self, name: &str, vendor: Vendor, components: &[&str]) -> Distribution {
        let mut dist = Distribution::new(name.to_string(), vendor);
        dist.insert(&self.conn).unwrap();
        for component in components {
            let component = Component::get_or_create(&self.conn, component).unwrap();
            dist.add_component(&self.conn, component.id.unwrap()).unwrap();
        }
        dist
    }

    /// Create a package with the given policy flags
    pub fn add_package(
        &self,
        name: &str,
        all_components: bool,
        all_distributions: bool,
        remove_on_update: bool,
    ) -> Package {
        let mut package = Package::new(name.to_string());
        package.all_components = all_components;
        package.all_distributions = all_distributions;
        package.remove_on_update = remove_on_update;
        package.insert(&self.conn).unwrap();
        package
    }

    /// `<incoming>/<name>`, created
    pub fn incoming_dir(&self, name: &str) -> PathBuf {
        let dir = self.incoming.join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}

/// Write a `.changes` file plus every file it references
///
/// Returns the path of the changes file.
pub fn write_upload(dir: &Path, source: &str, version: &str, arch: &str, files: &[&str]) -> PathBuf {
    let mut content = format!(
        "Format: 1.8\nSource: {source}\nVersion: {version}\nArchitecture: source {arch}\nFiles:\n"
    );
    for file in files {
        content.push_str(&format!(
            " d41d8cd98f00b204e9800998ecf8427e 0 utils optional {file}\n"
        ));
        fs::write(dir.join(file), b"payload").unwrap();
    }

    let path = dir.join(format!("{source}_{version}_{arch}.changes"));
    fs::write(&path, content).unwrap();
    path
}

/// Recursive listing of a tree: relative path -> kind and contents
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, String> {
    let mut entries = BTreeMap::new();
    collect(root, root, &mut entries);
    entries
}

fn collect(root: &Path, dir: &Path, entries: &mut BTreeMap<PathBuf, String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let rel = path.strip_prefix(root).unwrap().to_path_buf();
        let meta = fs::symlink_metadata(&path).unwrap();

        if meta.file_type().is_symlink() {
            let target = fs::read_link(&path).unwrap();
            entries.insert(rel, format!("link -> {}", target.display()));
        } else if meta.is_dir() {
            entries.insert(rel, "dir".to_string());
            collect(root, &path, entries);
        } else {
            entries.insert(rel, format!("file {} bytes", meta.len()));
        }
    }
}

/// Number of rows in a table
pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}
