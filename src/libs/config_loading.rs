use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::libs::paths::default_config_path;
use crate::schemas::settings::Settings;
use crate::{log_debug, log_info};

/// Loads `Settings` from `explicit` when given, else from the default
/// `<config dir>/lilyponddist/config.yaml`.
///
/// A missing file means defaults, except when the path was given explicitly:
/// asking for a specific file that does not exist is a configuration error.
/// Malformed YAML is always an error.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => {
                log_debug!("[Config] No config directory on this host, using defaults");
                return Ok(Settings::default());
            }
        },
    };

    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
            log_debug!("[Config] {} not found, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(e) => {
            return Err(Error::Config {
                path,
                reason: e.to_string(),
            });
        }
    };

    parse_settings(&contents, &path)
}

/// Parses YAML text; `origin` only labels errors and log lines.
pub fn parse_settings(contents: &str, origin: &Path) -> Result<Settings> {
    // An empty or comment-only file is a valid "all defaults" config.
    if contents.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
        log_debug!("[Config] {} is empty, using defaults", origin.display());
        return Ok(Settings::default());
    }

    let settings: Settings = serde_yaml::from_str(contents).map_err(|e| Error::Config {
        path: origin.to_path_buf(),
        reason: e.to_string(),
    })?;
    log_info!("[Config] Loaded settings from {}", origin.display().to_string().cyan());
    log_debug!("[Config] {:?}", settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::settings::RootPolicy;
    use tempfile::TempDir;

    #[test]
    fn explicit_file_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        fs::write(&path, "root_policy: wipe\nauto_install: false\n").unwrap();
        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.root_policy, RootPolicy::Wipe);
        assert!(!settings.auto_install);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_settings(Some(&tmp.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let err = parse_settings("version: [2, 24", Path::new("config.yaml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn comment_only_file_means_defaults() {
        let settings = parse_settings("# nothing here\n\n", Path::new("config.yaml")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
