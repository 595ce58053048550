// src/cli/incoming.rs
//! Incoming directory commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum IncomingCommands {
    /// Watch a directory for uploads
    Add {
        /// Directory location
        location: String,

        /// Add the directory in disabled state
        #[arg(long)]
        disabled: bool,
    },

    /// List watched directories
    List,

    /// Enable a directory
    Enable {
        /// Directory location
        location: String,
    },

    /// Disable a directory
    Disable {
        /// Directory location
        location: String,
    },
}
