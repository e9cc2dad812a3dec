use anyhow::Result;
use colored::Colorize;
use lilyponddist::{LilypondDist, Settings};

/// Summarizes where lilypond lives and whether it is current.
pub fn run(settings: &Settings) -> Result<()> {
    let dist = LilypondDist::from_settings(settings);
    let installer = dist.installer();
    let store = installer.store();

    println!("{:<12} {}", "Platform:".bold(), installer.host());
    println!("{:<12} {}", "Root:".bold(), store.root().display());

    let installed = store.scan();
    if installed.is_empty() {
        println!("{:<12} {}", "Installed:".bold(), "none".yellow());
    } else {
        for entry in installed.values() {
            println!("{:<12} {} ({})", "Installed:".bold(), entry.version.to_string().green(), entry.executable.display());
        }
        match dist.installed_version() {
            Ok((_, line)) => println!("{:<12} {}", "Reports:".bold(), line),
            Err(e) => println!("{:<12} {}", "Reports:".bold(), e.to_string().red()),
        }
    }

    match dist.check_for_update() {
        Some(latest) => println!("{:<12} {} available", "Update:".bold(), latest.to_string().yellow()),
        None => println!("{:<12} up to date", "Update:".bold()),
    }
    Ok(())
}
