// Default locations for the installation root and the configuration file.
use crate::log_warn;
use colored::Colorize;
use std::path::PathBuf;

/// Directory name used under the user's data and config directories.
pub const APP_DIR: &str = "lilyponddist";

/// Resolves a leading `~` to the user's home directory.
/// Paths without `~`, or without a resolvable home, are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") || path.starts_with("~\\") {
        if let Some(home) = dirs::home_dir() {
            let rest = path[1..].trim_start_matches(['/', '\\']);
            return if rest.is_empty() { home } else { home.join(rest) };
        }
    }
    PathBuf::from(path)
}

/// `<user data dir>/lilyponddist`, e.g. `~/.local/share/lilyponddist` on Linux.
pub fn default_install_root() -> PathBuf {
    match dirs::data_dir() {
        Some(data) => data.join(APP_DIR),
        None => {
            let fallback = std::env::temp_dir().join(APP_DIR);
            log_warn!(
                "[Paths] Could not determine the user data directory, using {}",
                fallback.display().to_string().yellow()
            );
            fallback
        }
    }
}

/// `<user config dir>/lilyponddist/config.yaml`, if a config dir exists on this host.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.yaml"))
}
