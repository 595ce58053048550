// src/error.rs

//! Error types for repomgr
//!
//! Almost every error is scoped to the incoming item being processed: the
//! pipeline logs it and moves on. [`Error::is_fatal`] marks the few that
//! must abort the whole batch.

use thiserror::Error;

/// Errors raised by the ingestion pipeline and the bookkeeping store
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The external program could not be started at all
    #[error("Failed to execute {program}: {source}")]
    ToolMissing {
        program: String,
        source: std::io::Error,
    },

    #[error("Signature for {0} is invalid")]
    SignatureInvalid(String),

    #[error("Couldn't copy file into storage: {0}")]
    StorageCopy(String),

    #[error("Link target already exists: {0}")]
    LinkConflict(String),

    #[error("Incoming directory is locked by another process: {0}")]
    Locked(String),
}

impl Error {
    /// Whether this error must abort the whole batch instead of one item
    ///
    /// A missing or unexecutable external tool will fail identically for
    /// every remaining item, and a broken bookkeeping store leaves nothing
    /// to record into.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ToolMissing { .. } | Error::Database(_))
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_missing_is_fatal() {
        let err = Error::ToolMissing {
            program: "reprepro".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("reprepro"));
    }

    #[test]
    fn test_item_errors_are_not_fatal() {
        assert!(!Error::SignatureInvalid("foo.rpm".to_string()).is_fatal());
        assert!(!Error::ParseError("bad line".to_string()).is_fatal());
        assert!(!Error::LinkConflict("/srv/rpm/extra/foo.rpm".to_string()).is_fatal());
    }
}
