// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, ComponentCommands, DistCommands, IncomingCommands, PackageCommands};
use repomgr::config::{IngestOptions, Settings};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise -v/-vv raise the default level
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "repomgr", &mut std::io::stdout());
        return Ok(());
    }

    let settings = Settings::load(Path::new(&cli.config))?;
    let db_path = cli
        .db_path
        .clone()
        .unwrap_or_else(|| settings.database.path.clone());

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),

        Commands::ProcessIncoming {
            dry_run,
            prerm,
            norm,
        } => {
            let options = IngestOptions {
                dry_run,
                verbose: cli.verbose > 0,
                no_remove: norm,
                prerm: prerm
                    .as_deref()
                    .map(IngestOptions::parse_prerm)
                    .unwrap_or_default(),
            };
            commands::cmd_process_incoming(&settings, &db_path, options)
        }

        Commands::Dist(cmd) => match cmd {
            DistCommands::Add {
                name,
                vendor,
                components,
            } => commands::cmd_dist_add(&name, &vendor, &components, &db_path),
            DistCommands::List => commands::cmd_dist_list(&db_path),
        },

        Commands::Component(cmd) => match cmd {
            ComponentCommands::Add {
                name,
                dists,
                disabled,
            } => commands::cmd_component_add(&name, &dists, disabled, &db_path),
            ComponentCommands::List => commands::cmd_component_list(&db_path),
            ComponentCommands::Enable { name } => {
                commands::cmd_component_set_enabled(&name, true, &db_path)
            }
            ComponentCommands::Disable { name } => {
                commands::cmd_component_set_enabled(&name, false, &db_path)
            }
        },

        Commands::Package(cmd) => match cmd {
            PackageCommands::Add {
                name,
                all_components,
                all_distributions,
                remove_on_update,
                components,
            } => {
                let policy = commands::PackagePolicy {
                    all_components,
                    all_distributions,
                    remove_on_update,
                };
                commands::cmd_package_add(&name, policy, &components, &db_path)
            }
            PackageCommands::List { name } => commands::cmd_package_list(name.as_deref(), &db_path),
        },

        Commands::Incoming(cmd) => match cmd {
            IncomingCommands::Add { location, disabled } => {
                commands::cmd_incoming_add(&location, disabled, &db_path)
            }
            IncomingCommands::List => commands::cmd_incoming_list(&db_path),
            IncomingCommands::Enable { location } => {
                commands::cmd_incoming_set_enabled(&location, true, &db_path)
            }
            IncomingCommands::Disable { location } => {
                commands::cmd_incoming_set_enabled(&location, false, &db_path)
            }
        },

        Commands::Completions { .. } => Ok(()),
    }
}
