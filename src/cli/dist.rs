// src/cli/dist.rs
//! Distribution management commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum DistCommands {
    /// Add a distribution
    Add {
        /// Distribution name (e.g. bookworm, el9)
        name: String,

        /// Vendor: debian, ubuntu, fedora or redhat
        #[arg(long)]
        vendor: String,

        /// Component to attach (created if missing); repeatable
        #[arg(short = 'C', long = "component", value_name = "NAME")]
        components: Vec<String>,
    },

    /// List distributions with their components
    List,
}
