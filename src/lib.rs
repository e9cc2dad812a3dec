//! # lilyponddist
//!
//! Downloads, caches and version-selects the official LilyPond binary
//! distributions for the host platform, and hands back a path to a
//! ready-to-run `lilypond` executable.
//!
//! Installed versions live side by side under one installation root
//! (`<root>/lilypond-2.24.4/bin/lilypond`). The root is the only state:
//! there is no manifest, a version is installed when its executable exists.

// Logging macros must be declared before the modules that use them.
#[macro_use]
pub mod logger;

pub mod error;
pub mod libs;
pub mod schemas;

pub use error::{Error, Result};
pub use libs::accessor::LilypondDist;
pub use libs::catalog::Catalog;
pub use libs::installer::{InstallRequest, InstallState, Installer, InstallerOptions};
pub use libs::utilities::assets::{FetchOptions, Fetcher, HttpFetcher};
pub use libs::utilities::compression::{ArchiveExpander, ArchiveExtractor};
pub use schemas::platform::PlatformKey;
pub use schemas::settings::{DownloadPolicy, RootPolicy, Settings};
pub use schemas::version::Version;

use std::path::PathBuf;

/// The executable of the greatest installed version, installing the latest
/// release first if nothing is installed. Reads the user's `config.yaml`.
pub fn lilypond_executable() -> Result<PathBuf> {
    let settings = libs::config_loading::load_settings(None)?;
    LilypondDist::from_settings(&settings).resolve_executable(None)
}
