use anyhow::Result;
use lilyponddist::{LilypondDist, Settings, Version};

pub fn run(settings: &Settings, version: Version) -> Result<()> {
    LilypondDist::from_settings(settings).uninstall(version)?;
    Ok(())
}
