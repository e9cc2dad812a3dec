use anyhow::Result;
use lilyponddist::{LilypondDist, Settings, Version};

/// Prints only the path on stdout so the output can be captured by scripts.
pub fn run(settings: &Settings, version: Option<Version>, no_auto_install: bool) -> Result<()> {
    let mut dist = LilypondDist::from_settings(settings);
    if no_auto_install {
        dist.set_auto_install(false);
    }
    let executable = dist.resolve_executable(version)?;
    println!("{}", executable.display());
    Ok(())
}
