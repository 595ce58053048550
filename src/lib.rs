// src/lib.rs

//! repomgr - incoming package ingestion
//!
//! Publishes uploaded Debian (`.changes`/`.deb`) and RPM packages from
//! watched incoming directories into their repositories and keeps a
//! SQLite record of what is published where.
//!
//! # Architecture
//!
//! - External tools do the repository work: reprepro for Debian, a flat
//!   pool plus per-component symlinks and createrepo for RPM
//! - Bookkeeping mirrors the tools' current index: one row per published
//!   source/binary, component sets replaced on every publish
//! - Every batch is idempotent: failed uploads stay in place and are
//!   retried in full on the next run

pub mod config;
pub mod db;
mod error;
pub mod ingest;
pub mod lock;
pub mod packages;
pub mod poll;
pub mod process;
pub mod tools;

pub use config::{IngestConfig, IngestOptions, Settings};
pub use error::{Error, Result};
pub use ingest::{IngestReport, Ingestor};
