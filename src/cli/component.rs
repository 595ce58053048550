// src/cli/component.rs
//! Component management commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum ComponentCommands {
    /// Add a component
    Add {
        /// Component name (e.g. main, extra-x86_64)
        name: String,

        /// Distribution to attach the component to; repeatable
        #[arg(long = "dist", value_name = "NAME")]
        dists: Vec<String>,

        /// Add the component in disabled state
        #[arg(long)]
        disabled: bool,
    },

    /// List components
    List,

    /// Enable a component
    Enable {
        /// Component name
        name: String,
    },

    /// Disable a component
    Disable {
        /// Component name
        name: String,
    },
}
