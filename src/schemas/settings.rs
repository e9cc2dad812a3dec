// Defines the user configuration read from `config.yaml`.
// Serde traits for deserialization; every field is optional in the file.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::libs::paths::{default_install_root, expand_tilde};
use crate::schemas::version::Version;

/// What to do when the download directory already holds a file under the
/// payload's name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadPolicy {
    /// Reuse the existing file without fetching.
    #[default]
    Skip,
    /// Delete the existing file and fetch again.
    Overwrite,
}

/// What happens to the installation root before an archive is expanded into it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootPolicy {
    /// Keep every other installed version next to the new one.
    #[default]
    Merge,
    /// Remove the whole root first, leaving only the new version.
    Wipe,
}

/// Contents of `config.yaml`.
///
/// ```yaml
/// version: 2.24.3
/// auto_install: true
/// download_policy: skip
/// root_policy: merge
/// root: ~/lilypond-dists
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Version to install when none is requested. Catalog latest when absent.
    pub version: Option<Version>,
    /// OS override; the host OS when absent.
    pub os: Option<String>,
    /// Architecture override; the host architecture when absent.
    pub arch: Option<String>,
    /// Install on first use when nothing suitable is installed.
    pub auto_install: bool,
    pub download_policy: DownloadPolicy,
    pub show_progress: bool,
    pub root_policy: RootPolicy,
    /// Installation root (`~` is expanded).
    pub root: Option<String>,
    /// Where archives are downloaded to (`~` is expanded). System temp dir when absent.
    pub download_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: None,
            os: None,
            arch: None,
            auto_install: true,
            download_policy: DownloadPolicy::default(),
            show_progress: true,
            root_policy: RootPolicy::default(),
            root: None,
            download_dir: None,
        }
    }
}

impl Settings {
    pub fn install_root(&self) -> PathBuf {
        match &self.root {
            Some(root) => expand_tilde(root),
            None => default_install_root(),
        }
    }

    pub fn download_dir(&self) -> PathBuf {
        match &self.download_dir {
            Some(dir) => expand_tilde(dir),
            None => std::env::temp_dir(),
        }
    }
}
