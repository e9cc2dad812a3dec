//! # Accessor
//!
//! `LilypondDist` is what applications talk to: ask it for an executable and
//! it answers with a path that runs, installing on first use when allowed.
//!
//! Nothing happens when the crate is loaded. Applications that want the
//! "install on first run" behavior call [`LilypondDist::initialize`] once,
//! deliberately, at startup.
//!
//! ```no_run
//! use lilyponddist::{LilypondDist, Settings};
//!
//! let mut dist = LilypondDist::from_settings(&Settings::default());
//! let lilypond = dist.resolve_executable(None)?;
//! # Ok::<(), lilyponddist::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::libs::catalog::Catalog;
use crate::libs::installer::{InstallRequest, Installer, InstallerOptions};
use crate::libs::utilities::assets::{Fetcher, HttpFetcher};
use crate::libs::utilities::compression::{ArchiveExpander, ArchiveExtractor};
use crate::libs::version_query::query_version;
use crate::schemas::settings::Settings;
use crate::schemas::version::Version;
use crate::{log_debug, log_error, log_info, log_warn};

use colored::Colorize;
use std::cell::OnceCell;
use std::path::PathBuf;

pub struct LilypondDist<F = HttpFetcher, X = ArchiveExtractor> {
    installer: Installer<F, X>,
    auto_install: bool,
    /// Version and platform overrides used when a call does not name a version.
    default_request: InstallRequest,
    /// Output of `lilypond --version` for the greatest installed version.
    version_line: OnceCell<(Version, String)>,
}

impl LilypondDist {
    /// The production accessor: built-in catalog, host platform, HTTP downloads.
    pub fn from_settings(settings: &Settings) -> Self {
        let options = InstallerOptions {
            download_dir: settings.download_dir(),
            download_policy: settings.download_policy,
            root_policy: settings.root_policy,
            show_progress: settings.show_progress,
        };
        let installer = Installer::new(Catalog::builtin(), settings.install_root(), options);
        let default_request = InstallRequest {
            version: settings.version,
            os: settings.os.clone(),
            arch: settings.arch.clone(),
        };
        LilypondDist::with_installer(installer, settings.auto_install, default_request)
    }
}

impl<F: Fetcher, X: ArchiveExpander> LilypondDist<F, X> {
    pub fn with_installer(
        installer: Installer<F, X>,
        auto_install: bool,
        default_request: InstallRequest,
    ) -> Self {
        LilypondDist {
            installer,
            auto_install,
            default_request,
            version_line: OnceCell::new(),
        }
    }

    pub fn installer(&self) -> &Installer<F, X> {
        &self.installer
    }

    pub fn auto_install(&self) -> bool {
        self.auto_install
    }

    pub fn set_auto_install(&mut self, enabled: bool) {
        self.auto_install = enabled;
    }

    /// Returns the executable of `version`, or of the greatest installed version
    /// when `None`. Installs first when nothing matches and auto-install is on.
    pub fn resolve_executable(&mut self, version: Option<Version>) -> Result<PathBuf> {
        let store = self.installer.store();
        if let Ok(entry) = store.root_for(version) {
            if !entry.executable.is_file() {
                return Err(Error::ExecutableMissing {
                    path: entry.executable.clone(),
                });
            }
            if let Some(latest) = self.check_for_update() {
                log_info!(
                    "[Accessor] There is an update available: lilypond {} (installed: {}). Run `lilyponddist update` or call `update()` to install it",
                    latest.to_string().green(),
                    entry.version
                );
            }
            log_debug!("[Accessor] Using {}", entry.executable.display());
            return Ok(entry.executable.clone());
        }

        // A directory without its binary is a broken install, not a missing one.
        let wanted = version.or(self.default_request.version);
        if let Some(v) = wanted.filter(|v| store.is_partial(*v)) {
            return Err(Error::ExecutableMissing {
                path: store.executable_in(&store.entry_dir(v)),
            });
        }

        if !self.auto_install {
            return Err(Error::NotInstalled { version });
        }

        let target = wanted.unwrap_or_else(|| self.installer.catalog().latest());
        log_info!(
            "[Accessor] lilypond {} is not installed, installing it now",
            target.to_string().yellow()
        );
        let request = InstallRequest {
            version: Some(target),
            ..self.default_request.clone()
        };
        self.install(&request)?;

        if let Ok(entry) = self.installer.store().root_for(Some(target)) {
            return Ok(entry.executable.clone());
        }
        // An `os` override installs another platform's build, which the store
        // does not list; its executable sits at the conventional path.
        let platform = self.installer.platform_for(&request);
        let executable = self.installer.executable_path(target, &platform);
        if !executable.is_file() {
            return Err(Error::ExecutableMissing { path: executable });
        }
        Ok(executable)
    }

    /// Never fails; any problem reading the root counts as "not installed".
    pub fn is_installed(&self, version: Option<Version>) -> bool {
        self.installer
            .store()
            .root_for(version)
            .map(|entry| entry.executable.is_file())
            .unwrap_or(false)
    }

    /// The catalog's latest version if it is newer than everything installed
    /// (or if nothing is installed at all).
    pub fn check_for_update(&self) -> Option<Version> {
        let latest = self.installer.catalog().latest();
        match self.installer.store().latest_installed() {
            Some(installed) if installed >= latest => None,
            _ => Some(latest),
        }
    }

    /// Installs through the installer and drops every memoized index.
    pub fn install(&mut self, request: &InstallRequest) -> Result<PathBuf> {
        let result = self.installer.install(request);
        self.version_line.take();
        result
    }

    /// Installs the latest version when nothing is installed or an update is
    /// available. Returns the version installed, or `None` when already current.
    pub fn update(&mut self) -> Result<Option<Version>> {
        let Some(latest) = self.check_for_update() else {
            log_debug!("[Accessor] No need to update");
            return Ok(None);
        };
        self.install(&InstallRequest {
            version: Some(latest),
            ..self.default_request.clone()
        })?;
        Ok(Some(latest))
    }

    /// Version reported by the installed binary (`lilypond --version`), with
    /// the banner line it came from.
    pub fn installed_version(&self) -> Result<(Version, String)> {
        if let Some(cached) = self.version_line.get() {
            return Ok(cached.clone());
        }
        let entry = self.installer.store().root_for(None)?;
        if !entry.executable.is_file() {
            return Err(Error::ExecutableMissing {
                path: entry.executable.clone(),
            });
        }
        let queried = query_version(&entry.executable)?;
        Ok(self.version_line.get_or_init(|| queried).clone())
    }

    /// True when the installed binary reports a version older than the catalog's latest.
    pub fn needs_update(&self) -> Result<bool> {
        let (current, _) = self.installed_version()?;
        Ok(current < self.installer.catalog().latest())
    }

    /// First-run setup: installs the latest version on a fresh (or outdated)
    /// root when auto-install is on. Returns the root when something was installed.
    pub fn initialize(&mut self) -> Result<Option<PathBuf>> {
        let platform = self.installer.platform_for(&self.default_request);
        if platform.os() == "darwin" {
            log_warn!("[Accessor] For macOS it is recommended to install lilypond via homebrew (`brew install lilypond`)");
            return Ok(None);
        }
        if platform.arch() != "x86_64" {
            log_error!(
                "[Accessor] At the moment only x86_64 builds are published, got {}",
                platform.arch().red()
            );
            return Ok(None);
        }

        match self.check_for_update() {
            None => {
                match self.installed_version() {
                    Ok((current, line)) => log_info!(
                        "[Accessor] lilypond is installed and up to date (current version: {}, version line: {})",
                        current.to_string().green(),
                        line
                    ),
                    Err(e) => log_warn!("[Accessor] lilypond is installed but {}", e),
                }
                Ok(None)
            }
            Some(latest) if !self.auto_install => {
                log_warn!(
                    "[Accessor] lilypond {} is available; auto-install is disabled, run `lilyponddist update`",
                    latest
                );
                Ok(None)
            }
            Some(latest) => {
                let root = self.install(&InstallRequest {
                    version: Some(latest),
                    ..self.default_request.clone()
                })?;
                Ok(Some(root))
            }
        }
    }

    pub fn uninstall(&mut self, version: Version) -> Result<()> {
        let result = self.installer.uninstall(version);
        self.version_line.take();
        result
    }

    /// Drops the memoized scan and version line, e.g. after the root was
    /// changed by another process.
    pub fn invalidate(&mut self) {
        self.installer.store_mut().invalidate();
        self.version_line.take();
    }
}
