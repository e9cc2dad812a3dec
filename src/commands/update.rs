use anyhow::Result;
use colored::Colorize;
use lilyponddist::{LilypondDist, Settings, log_info};

pub fn run(settings: &Settings) -> Result<()> {
    let mut dist = LilypondDist::from_settings(settings);
    match dist.update()? {
        Some(version) => log_info!("Updated lilypond to {}", version.to_string().green()),
        None => log_info!(
            "lilypond is up to date ({})",
            dist.installer().catalog().latest().to_string().green()
        ),
    }
    Ok(())
}
