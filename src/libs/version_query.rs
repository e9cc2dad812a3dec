// Asks an installed `lilypond` which version it is.

use crate::error::{Error, Result};
use crate::schemas::version::Version;
use crate::{log_debug, log_error};
use regex::Regex;
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

static BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"GNU LilyPond (\d+)\.(\d+)\.(\d+)").expect("version banner pattern is valid")
});

/// Runs `<binary> --version` and returns the parsed version together with the
/// line it was read from (normally the first line of the output).
pub fn query_version(binary: &Path) -> Result<(Version, String)> {
    let query_error = |reason: String| Error::VersionQuery {
        binary: binary.to_path_buf(),
        reason,
    };

    log_debug!("[Version] Running {} --version", binary.display());
    let output = Command::new(binary)
        .arg("--version")
        .output()
        .map_err(|e| query_error(e.to_string()))?;

    if !output.status.success() {
        log_error!("{}", String::from_utf8_lossy(&output.stderr).trim());
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string());
        return Err(query_error(format!("error code: {code}")));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_version_line(&stdout)
        .ok_or_else(|| query_error("no 'GNU LilyPond X.Y.Z' line in the output".to_string()))
}

/// Finds the first line carrying the `GNU LilyPond X.Y.Z` banner.
pub fn parse_version_line(output: &str) -> Option<(Version, String)> {
    output.lines().find_map(|line| {
        let caps = BANNER.captures(line)?;
        let major = caps[1].parse().ok()?;
        let minor = caps[2].parse().ok()?;
        let patch = caps[3].parse().ok()?;
        Some((Version::new(major, minor, patch), line.to_string()))
    })
}
