// src/cli/package.rs
//! Package policy commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum PackageCommands {
    /// Add a package, or update the policy of an existing one
    Add {
        /// Package name (source package name for Debian uploads)
        name: String,

        /// Publish into every enabled component of the distribution
        #[arg(long)]
        all_components: bool,

        /// Publish RPMs into every distribution of the same vendor
        #[arg(long)]
        all_distributions: bool,

        /// Remove previously published versions before adding a new one
        #[arg(long)]
        remove_on_update: bool,

        /// Explicit component membership; repeatable
        #[arg(short = 'C', long = "component", value_name = "NAME")]
        components: Vec<String>,
    },

    /// List packages and what is currently published
    List {
        /// Only show this package
        name: Option<String>,
    },
}
