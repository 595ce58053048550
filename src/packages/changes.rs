// src/packages/changes.rs

//! Debian `.changes` file reader
//!
//! Only the fields the ingestion pipeline consumes are interpreted: the
//! source name, the version and the `Files` list. Signed uploads are
//! accepted; the cleartext signature is stripped without verification
//! (reprepro checks signatures itself).

use crate::error::{Error, Result};
use debian_packaging::control::ControlParagraph;
use debian_packaging::debian_source_control::DebianSourceControlFile;
use std::io::Cursor;
use std::path::{Path, PathBuf};

const SIGNED_HEADER: &str = "-----BEGIN PGP SIGNED MESSAGE-----";

/// A parsed `.changes` upload manifest
#[derive(Debug, Clone)]
pub struct ChangesFile {
    path: PathBuf,
    paragraph: ControlParagraph<'static>,
    /// Filenames listed in the `Files` field, relative to the changes file
    files: Vec<String>,
}

impl ChangesFile {
    /// Read and parse a changes file from disk
    pub fn parse(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ParseError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse_str(path, &content)
    }

    /// Parse changes file content that was read from `path`
    pub fn parse_str(path: &Path, content: &str) -> Result<Self> {
        let control = if content.trim_start().starts_with(SIGNED_HEADER) {
            DebianSourceControlFile::from_armored_reader(Cursor::new(content.trim_start()))
        } else {
            DebianSourceControlFile::from_reader(Cursor::new(content))
        }
        .map_err(|e| Error::ParseError(format!("{}: {}", path.display(), e)))?;
        let paragraph = ControlParagraph::from(control);

        // Each line is `<md5> <size> <section> <priority> <filename>`
        let files: Vec<String> = paragraph
            .iter_field_lines("Files")
            .map(|lines| {
                lines
                    .filter_map(|line| line.split_whitespace().last())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        for file in &files {
            if file.contains('/') || file == ".." || file == "." {
                return Err(Error::ParseError(format!(
                    "{}: refusing file entry outside the upload directory: {}",
                    path.display(),
                    file
                )));
            }
        }

        let changes = Self {
            path: path.to_path_buf(),
            paragraph,
            files,
        };

        // Required by every consumer; fail early with a clear message
        changes.source()?;
        changes.version()?;

        Ok(changes)
    }

    /// Path of the changes file itself
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the upload lives in
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Look up a field by (case-insensitive) name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.paragraph.field_str(name).map(str::trim)
    }

    /// Source package name (`Source: foo` or `Source: foo (1.0-1)`)
    pub fn source(&self) -> Result<&str> {
        self.field("Source")
            .and_then(|s| s.split_whitespace().next())
            .ok_or_else(|| self.missing("Source"))
    }

    /// Full upload version, including the Debian revision
    pub fn version(&self) -> Result<&str> {
        self.field("Version")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| self.missing("Version"))
    }

    /// Every file referenced by the upload
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Referenced binary packages (`*.deb`)
    pub fn binary_packages(&self) -> Vec<&str> {
        self.files
            .iter()
            .map(String::as_str)
            .filter(|f| f.ends_with(".deb"))
            .collect()
    }

    /// Absolute location of a referenced file
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.dir().join(filename)
    }

    /// Whether every referenced file is present on disk
    pub fn exists(&self) -> bool {
        self.files.iter().all(|f| self.file_path(f).exists())
    }

    fn missing(&self, field: &str) -> Error {
        Error::ParseError(format!(
            "{}: missing {} field",
            self.path.display(),
            field
        ))
    }
}
