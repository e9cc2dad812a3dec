use anyhow::Result;
use colored::Colorize;
use lilyponddist::{InstallRequest, LilypondDist, Settings, Version, log_info};

/// Installs `version` (or the configured/latest one) and prints its executable path.
pub fn run(settings: &Settings, version: Option<Version>, os: Option<String>, arch: Option<String>) -> Result<()> {
    let mut dist = LilypondDist::from_settings(settings);
    let request = InstallRequest {
        version: version.or(settings.version),
        os: os.or_else(|| settings.os.clone()),
        arch: arch.or_else(|| settings.arch.clone()),
    };
    let target = request
        .version
        .unwrap_or_else(|| dist.installer().catalog().latest());

    let root = dist.install(&request)?;
    match dist.installer().store().root_for(Some(target)) {
        Ok(entry) => println!("{}", entry.executable.display()),
        // Builds for another OS are not runnable here; report where they went.
        Err(_) => println!("{}", root.display()),
    }
    log_info!("lilypond {} is ready", target.to_string().green());
    Ok(())
}
