//! # Installer
//!
//! Drives one LilyPond installation from a request to a verified entry in the
//! installation root. The fetcher and the archive expander are injected, so the
//! same state machine runs against the network in the CLI and against local
//! fixtures in the tests.
//!
//! ## States
//!
//! `Absent → Downloading → Expanding → PostProcessing → Installed`, or
//! `Failed(cause)` from any of them. The last state reached is kept on the
//! instance and every transition is logged at debug level.
//!
//! ## Workflow
//!
//! 1. **Platform** - request overrides win over the detected host key
//! 2. **Version** - the requested version, else the catalog's latest
//! 3. **URL** - catalog lookup; unknown version and unsupported platform are distinct failures
//! 4. **Download** - into the download directory under the URL's file name, honoring the download policy
//! 5. **Root** - created if absent; wiped first only under `RootPolicy::Wipe`
//! 6. **Expansion** - the archive is expanded directly into the root
//! 7. **Verification** - the store is invalidated and must now list the version
//! 8. **Cache repair** - `.go` bytecode caches are touched (never fatal)
//! 9. **Installed** - the root path is returned
//!
//! Steps 4 to 8 run while holding the advisory lock on `<root>.lock`.
//! Nothing is retried here; a failed download can simply be installed again.

use crate::error::{Error, Result};
use crate::libs::cache_repair::warm_bytecode_caches;
use crate::libs::catalog::Catalog;
use crate::libs::install_lock::InstallLock;
use crate::libs::store::{InstallStore, executable_name_for};
use crate::libs::utilities::assets::{FetchOptions, Fetcher, HttpFetcher, file_name_from_url};
use crate::libs::utilities::compression::{ArchiveExpander, ArchiveExtractor};
use crate::libs::utilities::platform::identify;
use crate::schemas::platform::PlatformKey;
use crate::schemas::settings::{DownloadPolicy, RootPolicy};
use crate::schemas::version::Version;
use crate::{log_debug, log_error, log_info, log_warn};

use colored::Colorize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Why an installation ended in `InstallState::Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    UnknownVersion,
    UnsupportedPlatform,
    Download,
    UnsupportedFormat,
    Expansion,
    ExecutableMissing,
    Filesystem,
}

impl FailureCause {
    pub fn of(error: &Error) -> Self {
        match error {
            Error::UnknownVersion { .. } | Error::InvalidVersion(_) => FailureCause::UnknownVersion,
            Error::UnsupportedPlatform { .. } | Error::InvalidPlatform(_) => {
                FailureCause::UnsupportedPlatform
            }
            Error::Download { .. } => FailureCause::Download,
            Error::UnsupportedFormat { .. } => FailureCause::UnsupportedFormat,
            Error::Archive { .. } => FailureCause::Expansion,
            Error::ExecutableMissing { .. } | Error::NotInstalled { .. } => {
                FailureCause::ExecutableMissing
            }
            _ => FailureCause::Filesystem,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Absent,
    Downloading,
    Expanding,
    PostProcessing,
    Installed,
    Failed(FailureCause),
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallState::Absent => write!(f, "absent"),
            InstallState::Downloading => write!(f, "downloading"),
            InstallState::Expanding => write!(f, "expanding"),
            InstallState::PostProcessing => write!(f, "post-processing"),
            InstallState::Installed => write!(f, "installed"),
            InstallState::Failed(cause) => write!(f, "failed ({cause:?})"),
        }
    }
}

/// What to install. Every field is optional; `Default` means "latest, for this host".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRequest {
    pub version: Option<Version>,
    pub os: Option<String>,
    pub arch: Option<String>,
}

impl InstallRequest {
    /// Accepts a `Version` or a `(major, minor, patch)` triple.
    pub fn for_version(version: impl Into<Version>) -> Self {
        InstallRequest {
            version: Some(version.into()),
            ..Default::default()
        }
    }

    /// Parses the version from its string form (`"2.24"`, `"2.24.3"`, `"v2.24.3"`).
    pub fn parse(version: &str) -> Result<Self> {
        Ok(InstallRequest::for_version(version.parse::<Version>()?))
    }

    pub fn on_platform(mut self, os: Option<String>, arch: Option<String>) -> Self {
        self.os = os;
        self.arch = arch;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerOptions {
    /// Scratch directory for downloaded archives.
    pub download_dir: PathBuf,
    pub download_policy: DownloadPolicy,
    pub root_policy: RootPolicy,
    pub show_progress: bool,
}

impl Default for InstallerOptions {
    fn default() -> Self {
        InstallerOptions {
            download_dir: std::env::temp_dir(),
            download_policy: DownloadPolicy::Skip,
            root_policy: RootPolicy::Merge,
            show_progress: true,
        }
    }
}

pub struct Installer<F = HttpFetcher, X = ArchiveExtractor> {
    catalog: Catalog,
    store: InstallStore,
    host: PlatformKey,
    fetcher: F,
    expander: X,
    options: InstallerOptions,
    state: InstallState,
}

impl Installer {
    /// An installer for this host, downloading over HTTP and expanding zip/tar.gz.
    pub fn new(catalog: Catalog, root: impl Into<PathBuf>, options: InstallerOptions) -> Self {
        Installer::with_collaborators(
            catalog,
            root,
            identify(),
            HttpFetcher::new(),
            ArchiveExtractor,
            options,
        )
    }
}

impl<F: Fetcher, X: ArchiveExpander> Installer<F, X> {
    pub fn with_collaborators(
        catalog: Catalog,
        root: impl Into<PathBuf>,
        host: PlatformKey,
        fetcher: F,
        expander: X,
        options: InstallerOptions,
    ) -> Self {
        let store = InstallStore::new(root, &host);
        Installer {
            catalog,
            store,
            host,
            fetcher,
            expander,
            options,
            state: InstallState::Absent,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &InstallStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut InstallStore {
        &mut self.store
    }

    pub fn host(&self) -> &PlatformKey {
        &self.host
    }

    pub fn options(&self) -> &InstallerOptions {
        &self.options
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The state reached by the last `install` call.
    pub fn state(&self) -> InstallState {
        self.state
    }

    /// The platform a request resolves to: its overrides on top of the host key.
    pub fn platform_for(&self, request: &InstallRequest) -> PlatformKey {
        self.host
            .with_overrides(request.os.as_deref(), request.arch.as_deref())
    }

    /// Installs the requested version and returns the installation root.
    ///
    /// # Arguments
    /// * `request`: Version and platform overrides. Unset fields fall back to the
    ///   catalog's latest version and the host platform.
    ///
    /// # Returns
    /// * `Result<PathBuf>`: the installation root on success. On failure the
    ///   state is `Failed(cause)` and the memoized store scan is dropped.
    pub fn install(&mut self, request: &InstallRequest) -> Result<PathBuf> {
        self.state = InstallState::Absent;
        let result = self.run(request);
        if let Err(e) = &result {
            // The root may have been partially mutated.
            self.store.invalidate();
            self.transition(InstallState::Failed(FailureCause::of(e)));
            log_error!("[Installer] {}", e);
        }
        result
    }

    /// Installs the catalog's latest version for this host.
    pub fn update(&mut self) -> Result<PathBuf> {
        let latest = self.catalog.latest();
        self.install(&InstallRequest::for_version(latest))
    }

    /// Removes one installed version from the root.
    pub fn uninstall(&mut self, version: Version) -> Result<()> {
        let _lock = InstallLock::acquire(self.store.root())?;
        self.store.remove(version)?;
        log_info!("[Installer] Removed lilypond {}", version.to_string().green());
        Ok(())
    }

    fn run(&mut self, request: &InstallRequest) -> Result<PathBuf> {
        // 1. Resolve platform, version and URL before touching the disk.
        let platform = self.platform_for(request);
        let version = request.version.unwrap_or_else(|| self.catalog.latest());
        let url = self.catalog.url_for(version, &platform)?.to_string();
        log_info!(
            "[Installer] Installing lilypond {} for {}",
            version.to_string().green(),
            platform.to_string().cyan()
        );

        // 2. Everything below mutates the root or the download dir.
        let root = self.store.root().to_path_buf();
        let _lock = InstallLock::acquire(&root)?;

        self.transition(InstallState::Downloading);
        let archive = self.download(&url)?;

        // 3. Expand straight into the root, then re-scan it.
        self.transition(InstallState::Expanding);
        self.prepare_root(&root)?;
        log_info!("[Installer] Uncompressing {} to {}", archive.display(), root.display());
        self.expander.expand(&archive, &root)?;
        self.store.invalidate();
        let entry_dir = self.verify(version, &platform)?;

        // 4. Bytecode repair; never fatal.
        self.transition(InstallState::PostProcessing);
        let report = warm_bytecode_caches(&entry_dir, version);
        log_debug!(
            "[Installer] Cache repair touched {} file(s), {} subtree(s) missing",
            report.touched,
            report.missing.len()
        );

        self.transition(InstallState::Installed);
        log_info!(
            "[Installer] lilypond {} installed at {}",
            version.to_string().green(),
            entry_dir.display().to_string().cyan()
        );
        Ok(root)
    }

    /// Puts the archive behind `url` into the download directory.
    ///
    /// # Arguments
    /// * `url`: Catalog URL; its last path segment names the local file.
    ///
    /// # Returns
    /// * `Result<PathBuf>`: the local archive. An existing file is reused under
    ///   `DownloadPolicy::Skip` and replaced under `DownloadPolicy::Overwrite`.
    ///   A fetch that reports success without leaving a file is `Error::Download`.
    fn download(&self, url: &str) -> Result<PathBuf> {
        let file_name = file_name_from_url(url)?;
        let dest_dir = &self.options.download_dir;
        let dest = dest_dir.join(&file_name);

        if dest.exists() {
            match self.options.download_policy {
                DownloadPolicy::Skip => {
                    log_warn!(
                        "[Installer] Destination {} already exists, no need to download",
                        dest.display().to_string().yellow()
                    );
                    return Ok(dest);
                }
                DownloadPolicy::Overwrite => {
                    log_info!("[Installer] Removing previously downloaded {}", dest.display());
                    fs::remove_file(&dest)?;
                }
            }
        }
        fs::create_dir_all(dest_dir)?;

        // The fetcher stages into a temp file; only a complete transfer lands at `dest`.
        let fetch_options = FetchOptions {
            show_progress: self.options.show_progress,
            skip_if_exists: self.options.download_policy == DownloadPolicy::Skip,
        };
        let fetched = self.fetcher.fetch(url, dest_dir, &fetch_options)?;
        // Trust the disk, not the fetcher's return value.
        if !fetched.is_file() {
            return Err(Error::Download {
                url: url.to_string(),
                reason: format!("{} is absent after the transfer", fetched.display()),
            });
        }
        Ok(fetched)
    }

    /// Makes sure `root` exists. Under `RootPolicy::Wipe` every previously
    /// installed version is deleted first; `Merge` leaves them in place.
    fn prepare_root(&mut self, root: &Path) -> Result<()> {
        if self.options.root_policy == RootPolicy::Wipe && root.exists() {
            log_warn!(
                "[Installer] Removing previous installation root {}",
                root.display().to_string().yellow()
            );
            fs::remove_dir_all(root)?;
            // The memoized scan still lists the deleted versions.
            self.store.invalidate();
        }
        fs::create_dir_all(root)?;
        Ok(())
    }

    /// Where the executable of `version` built for `platform` lives once
    /// installed: `<root>/lilypond-<version>/bin/lilypond[.exe]`.
    ///
    /// Unlike the store, this does not assume the host's executable name, so it
    /// also locates builds installed with an `os` override.
    pub fn executable_path(&self, version: Version, platform: &PlatformKey) -> PathBuf {
        self.store
            .entry_dir(version)
            .join("bin")
            .join(executable_name_for(platform))
    }

    // The store only knows the host's executable name; an install for another
    // OS is checked at its conventional path instead.
    fn verify(&self, version: Version, platform: &PlatformKey) -> Result<PathBuf> {
        let entry_dir = self.store.entry_dir(version);
        let executable = self.executable_path(version, platform);

        let present = if executable_name_for(platform) == self.store.executable_name() {
            self.store.root_for(Some(version)).is_ok()
        } else {
            executable.is_file()
        };

        if !present {
            return Err(Error::ExecutableMissing { path: executable });
        }
        Ok(entry_dir)
    }

    fn transition(&mut self, next: InstallState) {
        log_debug!("[Installer] {} -> {}", self.state, next);
        self.state = next;
    }
}
