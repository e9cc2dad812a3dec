//! Error taxonomy for every fallible operation in the crate.
//!
//! Each failure the installer or accessor can hit surfaces as its own variant
//! so callers can print targeted diagnostics: an unknown version is not the
//! same problem as a platform without a published build, and neither is
//! retryable, while a failed download is.

use crate::schemas::platform::PlatformKey;
use crate::schemas::version::Version;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested version is not in the catalog.
    #[error("version {version} unknown, possible versions: {}", join(.available))]
    UnknownVersion {
        version: Version,
        available: Vec<Version>,
    },

    /// The version exists but has no build for this OS/architecture.
    #[error(
        "platform {platform} not supported for version {version}, possible platforms: {}{}",
        join(.supported),
        hint(.alternative)
    )]
    UnsupportedPlatform {
        version: Version,
        platform: PlatformKey,
        supported: Vec<PlatformKey>,
        /// Human-actionable alternative for known gaps (e.g. Homebrew on Apple silicon).
        alternative: Option<String>,
    },

    /// The payload could not be retrieved, or is absent after the fetch.
    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    /// The archive suffix is neither `.zip` nor `.tar.gz`.
    #[error("file format of {} not supported", .path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Nothing usable is installed and auto-install is disabled.
    #[error("lilypond is not installed{}", version_suffix(.version))]
    NotInstalled { version: Option<Version> },

    /// An entry directory exists but its executable does not.
    #[error("lilypond executable missing at {}, reinstall to repair", .path.display())]
    ExecutableMissing { path: PathBuf },

    /// The installed binary failed to report its version.
    #[error("error while running '{} --version': {reason}", .binary.display())]
    VersionQuery { binary: PathBuf, reason: String },

    #[error("invalid version '{0}', expected MAJOR.MINOR[.PATCH]")]
    InvalidVersion(String),

    /// No catalog version carries this platform key at all.
    #[error("no version in the catalog supports platform {0}")]
    InvalidPlatform(PlatformKey),

    #[error("catalog entry for version {0} has no platforms")]
    EmptyCatalogEntry(Version),

    #[error("the catalog has no versions")]
    EmptyCatalog,

    #[error("invalid configuration in {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    /// The archive was recognized but could not be expanded.
    #[error("failed to expand {}: {reason}", .path.display())]
    Archive { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Only transient transfer failures are worth re-invoking `install` for.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Download { .. })
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn hint(alternative: &Option<String>) -> String {
    match alternative {
        Some(alt) => format!(". {alt}"),
        None => String::new(),
    }
}

fn version_suffix(version: &Option<Version>) -> String {
    match version {
        Some(v) => format!(" (version {v})"),
        None => String::new(),
    }
}
