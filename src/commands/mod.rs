// Register application subcommands.
// Each module corresponds to a specific `lilyponddist` command-line action.

use crate::cli::cmd_enums::{Cli, Commands};
use anyhow::{Context, Result};
use lilyponddist::Settings;
use lilyponddist::libs::config_loading::load_settings;

// Installs a version (latest by default).
pub mod install;
// Lists the catalog.
pub mod list;
// Resolves the executable path.
pub mod path;
// Prints the detected platform key.
pub mod platform;
// Summarizes the installation root.
pub mod status;
// Removes one installed version.
pub mod uninstall;
// Installs the latest version when newer.
pub mod update;
// Displays the version of lilyponddist.
pub mod version;

/// Runs the parsed command line.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Version => {
            version::run();
            Ok(())
        }
        Commands::Platform { raw } => {
            platform::run(raw);
            Ok(())
        }
        command => {
            let settings = settings_for(&cli.global)?;
            match command {
                Commands::Install { version, os, arch } => install::run(&settings, version, os, arch),
                Commands::Update => update::run(&settings),
                Commands::Path {
                    version,
                    no_auto_install,
                } => path::run(&settings, version, no_auto_install),
                Commands::Status => status::run(&settings),
                Commands::List => list::run(&settings),
                Commands::Uninstall { version } => uninstall::run(&settings, version),
                Commands::Version | Commands::Platform { .. } => Ok(()),
            }
        }
    }
}

fn settings_for(global: &crate::cli::cmd_enums::GlobalArgs) -> Result<Settings> {
    let mut settings = load_settings(global.config.as_deref()).context("could not load settings")?;
    global.apply(&mut settings);
    Ok(settings)
}
