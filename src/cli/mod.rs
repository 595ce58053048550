// src/cli/mod.rs
//! CLI definitions for repomgr
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! The batch itself is `process-incoming`; the remaining commands seed the
//! bookkeeping store:
//! - `dist` - Distributions and their components
//! - `component` - Components (enable/disable)
//! - `package` - Package publication policy
//! - `incoming` - Watched incoming directories

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

mod component;
mod dist;
mod incoming;
mod package;

pub use component::ComponentCommands;
pub use dist::DistCommands;
pub use incoming::IncomingCommands;
pub use package::PackageCommands;

#[derive(Parser)]
#[command(name = "repomgr")]
#[command(version)]
#[command(about = "Publish uploaded Debian and RPM packages into their repositories", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = repomgr::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Path to the database file (overrides [database] path)
    #[arg(short, long, global = true)]
    pub db_path: Option<String>,

    /// Echo external commands (-v) and enable debug logging (-vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or migrate the bookkeeping database
    Init,

    /// Publish everything waiting in the enabled incoming directories
    ProcessIncoming {
        /// Rehearse the batch: run nothing, change nothing
        #[arg(long)]
        dry_run: bool,

        /// Comma-separated packages to remove before adding the new version
        #[arg(long, value_name = "PKG,PKG")]
        prerm: Option<String>,

        /// Keep uploaded files after publishing them
        #[arg(long)]
        norm: bool,
    },

    /// Manage distributions
    #[command(subcommand)]
    Dist(DistCommands),

    /// Manage components
    #[command(subcommand)]
    Component(ComponentCommands),

    /// Manage package publication policy
    #[command(subcommand)]
    Package(PackageCommands),

    /// Manage watched incoming directories
    #[command(subcommand)]
    Incoming(IncomingCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
