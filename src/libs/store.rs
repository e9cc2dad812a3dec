// The installation store: a single root directory holding one subdirectory per
// installed LilyPond version (`lilypond-2.24.3/`, `lilypond-2.24.4/`, ...).
//
// There is no manifest. A version counts as installed when its directory
// follows the naming convention and `bin/lilypond` exists inside it. The scan
// result is memoized on the instance; whoever mutates the root must call
// `invalidate()` afterwards.

use crate::error::{Error, Result};
use crate::schemas::platform::PlatformKey;
use crate::schemas::version::Version;
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the managed product; also the prefix of every entry directory.
pub const PRODUCT: &str = "lilypond";

/// A verified installation of one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledEntry {
    pub version: Version,
    /// `<root>/lilypond-<version>`
    pub dir: PathBuf,
    /// `<dir>/bin/lilypond[.exe]`
    pub executable: PathBuf,
}

#[derive(Debug)]
pub struct InstallStore {
    root: PathBuf,
    executable_name: String,
    scanned: OnceCell<BTreeMap<Version, InstalledEntry>>,
}

impl InstallStore {
    /// `platform` decides the executable name (`lilypond.exe` on Windows).
    pub fn new(root: impl Into<PathBuf>, platform: &PlatformKey) -> Self {
        InstallStore {
            root: root.into(),
            executable_name: executable_name_for(platform),
            scanned: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn executable_name(&self) -> &str {
        &self.executable_name
    }

    /// The conventional directory of `version`, whether or not it exists.
    pub fn entry_dir(&self, version: Version) -> PathBuf {
        self.root.join(format!("{PRODUCT}-{version}"))
    }

    /// The executable path inside an entry directory.
    pub fn executable_in(&self, entry_dir: &Path) -> PathBuf {
        entry_dir.join("bin").join(&self.executable_name)
    }

    /// Installed versions, keyed by version. An absent root is an empty map.
    pub fn scan(&self) -> &BTreeMap<Version, InstalledEntry> {
        self.scanned.get_or_init(|| self.scan_root())
    }

    /// Drops the memoized scan; the next `scan()` reads the disk again.
    pub fn invalidate(&mut self) {
        if self.scanned.take().is_some() {
            log_debug!("[Store] Invalidated installed-version index for {}", self.root.display());
        }
    }

    /// The entry for `version`, or for the greatest installed version when `None`.
    ///
    /// # Arguments
    /// * `version`: An exact version, or `None` for the newest one on disk.
    ///
    /// # Returns
    /// * `Result<&InstalledEntry>`: `Error::NotInstalled` carrying the requested
    ///   version when nothing matches.
    pub fn root_for(&self, version: Option<Version>) -> Result<&InstalledEntry> {
        let installed = self.scan();
        let entry = match version {
            Some(v) => installed.get(&v),
            None => installed.values().next_back(),
        };
        entry.ok_or(Error::NotInstalled { version })
    }

    pub fn latest_installed(&self) -> Option<Version> {
        self.scan().keys().next_back().copied()
    }

    /// True when the directory for `version` exists but holds no executable,
    /// which is what an interrupted expansion leaves behind.
    pub fn is_partial(&self, version: Version) -> bool {
        let dir = self.entry_dir(version);
        dir.is_dir() && !self.executable_in(&dir).exists()
    }

    /// Deletes the directory of one version. Other versions are left alone.
    pub fn remove(&mut self, version: Version) -> Result<()> {
        let dir = self.entry_dir(version);
        if !dir.exists() {
            return Err(Error::NotInstalled {
                version: Some(version),
            });
        }
        log_info!("[Store] Removing {}", dir.display().to_string().yellow());
        let removed = fs::remove_dir_all(&dir);
        self.invalidate();
        removed.map_err(Error::from)
    }

    /// Reads the root once and lists every verified entry.
    ///
    /// # Returns
    /// * `BTreeMap<Version, InstalledEntry>`: installed versions in ascending
    ///   order. Unreadable roots, stray files, foreign directory names and
    ///   directories without an executable are left out rather than reported.
    fn scan_root(&self) -> BTreeMap<Version, InstalledEntry> {
        let mut installed = BTreeMap::new();

        // A missing root is the normal state before the first install.
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log_debug!("[Store] Installation root {} does not exist yet", self.root.display());
                return installed;
            }
            Err(e) => {
                log_warn!("[Store] Could not read installation root {}: {}", self.root.display(), e);
                return installed;
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            // Only `lilypond-<version>` directories are candidates.
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(version) = parse_entry_name(name) else {
                continue;
            };

            // An interrupted expansion leaves the directory without its binary.
            log_debug!("[Store] Searching lilypond in '{}'", path.display());
            let executable = self.executable_in(&path);
            if !executable.exists() {
                log_debug!("[Store] Skipping {}: no {}", name, executable.display());
                continue;
            }

            // `lilypond-2.24` and `lilypond-2.24.0` name the same version; the
            // canonical spelling wins.
            let canonical = name == format!("{PRODUCT}-{version}");
            if canonical || !installed.contains_key(&version) {
                installed.insert(
                    version,
                    InstalledEntry {
                        version,
                        dir: path,
                        executable,
                    },
                );
            }
        }

        log_debug!(
            "[Store] Found {} installed version(s) under {}",
            installed.len(),
            self.root.display()
        );
        installed
    }
}

/// `lilypond.exe` on Windows, `lilypond` everywhere else.
pub fn executable_name_for(platform: &PlatformKey) -> String {
    if platform.is_windows() {
        format!("{PRODUCT}.exe")
    } else {
        PRODUCT.to_string()
    }
}

/// Parses `lilypond-<version>` directory names.
pub fn parse_entry_name(name: &str) -> Option<Version> {
    name.strip_prefix(PRODUCT)?
        .strip_prefix('-')?
        .parse()
        .ok()
}
