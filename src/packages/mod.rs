// src/packages/mod.rs

//! Upload formats understood by the ingestion pipeline
//!
//! Nothing here reads package payloads; publication correctness is left to
//! reprepro and createrepo. These modules only identify what an upload is.

pub mod changes;
pub mod deb;
pub mod rpm;

pub use changes::ChangesFile;
pub use deb::{DebFilename, upstream_version};
pub use rpm::{RpmIdentity, RpmQueryInfo};
