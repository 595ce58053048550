// src/tools.rs

//! Command lines and on-disk layout of the external repository tools
//!
//! The pipelines never format tool arguments themselves; they ask the
//! vendor-specific builders here, so the base flags and the RPM tree
//! layout live in one place.

use std::path::{Path, PathBuf};

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// reprepro invocations against one repository base directory
#[derive(Debug, Clone)]
pub struct Reprepro {
    base: Vec<String>,
}

impl Reprepro {
    pub fn new(program: &str, basedir: &Path) -> Self {
        Self {
            base: vec![
                program.to_string(),
                "-b".to_string(),
                path_arg(basedir),
                // automatically generated -dbgsym packages are not listed in
                // the .changes file
                "--ignore=surprisingbinary".to_string(),
                // changelogs name "unstable" regardless of the target
                "--ignore=wrongdistribution".to_string(),
            ],
        }
    }

    fn with(&self, args: &[&str]) -> Vec<String> {
        let mut argv = self.base.clone();
        argv.extend(args.iter().map(|a| a.to_string()));
        argv
    }

    /// Remove a source package (and its binaries) from a distribution
    pub fn removesrc(&self, dist: &str, source: &str) -> Vec<String> {
        self.with(&["removesrc", dist, source])
    }

    /// Publish a whole upload described by a .changes file
    pub fn include(&self, component: &str, dist: &str, changes: &Path) -> Vec<String> {
        self.with(&["-C", component, "include", dist, &path_arg(changes)])
    }

    /// Publish a single binary package
    pub fn includedeb(&self, component: &str, dist: &str, deb: &Path) -> Vec<String> {
        self.with(&["-C", component, "includedeb", dist, &path_arg(deb)])
    }
}

/// rpm and createrepo invocations
#[derive(Debug, Clone)]
pub struct RpmTools {
    rpm: String,
    createrepo: String,
}

impl RpmTools {
    pub fn new(rpm: &str, createrepo: &str) -> Self {
        Self {
            rpm: rpm.to_string(),
            createrepo: createrepo.to_string(),
        }
    }

    /// Verify the package signature; exit 0 means valid
    pub fn checksig(&self, path: &Path) -> Vec<String> {
        vec![
            self.rpm.clone(),
            "--quiet".to_string(),
            "--checksig".to_string(),
            path_arg(path),
        ]
    }

    /// Query package info (`key: value` lines)
    pub fn query_info(&self, path: &Path) -> Vec<String> {
        vec![self.rpm.clone(), "-qpi".to_string(), path_arg(path)]
    }

    /// Regenerate repository metadata of one component directory
    pub fn createrepo(&self, component_dir: &Path) -> Vec<String> {
        vec![
            self.createrepo.clone(),
            "-d".to_string(),
            "--basedir".to_string(),
            path_arg(component_dir),
            "--update".to_string(),
            ".".to_string(),
        ]
    }
}

/// Relabel a tree after files were added
pub fn restorecon(program: &str, dir: &Path) -> Vec<String> {
    vec![program.to_string(), "-Rv".to_string(), path_arg(dir)]
}

/// Layout of the RPM tree: a flat pool plus one symlink farm per component
#[derive(Debug, Clone)]
pub struct RpmTree {
    base: PathBuf,
}

impl RpmTree {
    pub fn new(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
        }
    }

    /// `<base>/rpms`
    pub fn pool_dir(&self) -> PathBuf {
        self.base.join("rpms")
    }

    /// `<base>/rpms/<canonical-name>`
    pub fn pool_path(&self, filename: &str) -> PathBuf {
        self.pool_dir().join(filename)
    }

    /// Glob matching every pooled file of a package name
    pub fn pool_pattern(&self, name: &str) -> String {
        format!("{}/{}-*-*.*.*.rpm", self.pool_dir().display(), glob::Pattern::escape(name))
    }

    /// `<base>/<component>`
    pub fn component_dir(&self, component: &str) -> PathBuf {
        self.base.join(component)
    }

    /// `<base>/<component>/<filename>`
    pub fn link_path(&self, component: &str, filename: &str) -> PathBuf {
        self.component_dir(component).join(filename)
    }
}
