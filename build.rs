// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Name argument shared by the enable/disable/add subcommands
fn name_arg(help: &'static str) -> Arg {
    Arg::new("name").required(true).help(help)
}

fn disabled_arg(help: &'static str) -> Arg {
    Arg::new("disabled")
        .long("disabled")
        .action(ArgAction::SetTrue)
        .help(help)
}

fn component_arg() -> Arg {
    Arg::new("component")
        .short('C')
        .long("component")
        .action(ArgAction::Append)
        .help("Component (repeatable)")
}

fn build_cli() -> Command {
    Command::new("repomgr")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Publish incoming Debian and RPM uploads into their repositories")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .default_value("/etc/repomgr/repomgr.toml")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("db_path")
                .short('d')
                .long("db-path")
                .global(true)
                .help("Database path (overrides the configuration file)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Print commands and increase log verbosity"),
        )
        .subcommand(Command::new("init").about("Initialize the bookkeeping database"))
        .subcommand(
            Command::new("process-incoming")
                .about("Publish everything found in the enabled incoming directories")
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Show what would be done without doing it"),
                )
                .arg(
                    Arg::new("prerm")
                        .long("prerm")
                        .value_name("PKGS")
                        .help("Comma-separated packages to remove before adding"),
                )
                .arg(
                    Arg::new("norm")
                        .long("norm")
                        .action(ArgAction::SetTrue)
                        .help("Keep uploaded files after publishing"),
                ),
        )
        .subcommand(
            Command::new("dist")
                .about("Manage distributions")
                .subcommand(
                    Command::new("add")
                        .about("Add a distribution")
                        .arg(name_arg("Distribution name"))
                        .arg(Arg::new("vendor").long("vendor").required(true).help("Vendor"))
                        .arg(component_arg()),
                )
                .subcommand(Command::new("list").about("List distributions")),
        )
        .subcommand(
            Command::new("component")
                .about("Manage components")
                .subcommand(
                    Command::new("add")
                        .about("Add a component")
                        .arg(name_arg("Component name"))
                        .arg(
                            Arg::new("dist")
                                .long("dist")
                                .action(ArgAction::Append)
                                .help("Distribution to attach to (repeatable)"),
                        )
                        .arg(disabled_arg("Add the component disabled")),
                )
                .subcommand(Command::new("list").about("List components"))
                .subcommand(
                    Command::new("enable")
                        .about("Enable a component")
                        .arg(name_arg("Component name")),
                )
                .subcommand(
                    Command::new("disable")
                        .about("Disable a component")
                        .arg(name_arg("Component name")),
                ),
        )
        .subcommand(
            Command::new("package")
                .about("Manage packages")
                .subcommand(
                    Command::new("add")
                        .about("Add or update a package")
                        .arg(name_arg("Package name"))
                        .arg(
                            Arg::new("all_components")
                                .long("all-components")
                                .action(ArgAction::SetTrue)
                                .help("Publish into every enabled component"),
                        )
                        .arg(
                            Arg::new("all_distributions")
                                .long("all-distributions")
                                .action(ArgAction::SetTrue)
                                .help("Publish RPMs into every distribution of the vendor"),
                        )
                        .arg(
                            Arg::new("remove_on_update")
                                .long("remove-on-update")
                                .action(ArgAction::SetTrue)
                                .help("Remove published versions before adding a new one"),
                        )
                        .arg(component_arg()),
                )
                .subcommand(
                    Command::new("list")
                        .about("List packages and what is published")
                        .arg(Arg::new("name").help("Only this package")),
                ),
        )
        .subcommand(
            Command::new("incoming")
                .about("Manage incoming directories")
                .subcommand(
                    Command::new("add")
                        .about("Watch an incoming directory")
                        .arg(Arg::new("location").required(true).help("Absolute path"))
                        .arg(disabled_arg("Add the directory disabled")),
                )
                .subcommand(Command::new("list").about("List incoming directories"))
                .subcommand(
                    Command::new("enable")
                        .about("Enable an incoming directory")
                        .arg(Arg::new("location").required(true).help("Absolute path")),
                )
                .subcommand(
                    Command::new("disable")
                        .about("Disable an incoming directory")
                        .arg(Arg::new("location").required(true).help("Absolute path")),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("repomgr.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
