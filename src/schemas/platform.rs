//! # Platform Keys
//!
//! A `PlatformKey` is the normalized `(os, arch)` pair used to index the
//! catalog. Operating systems are drawn from `linux`, `windows` and `darwin`;
//! architectures from `x86_64`, `arm64`, `x86` and the 32-bit labels the
//! platform identifier may produce (`i686`, `i386`, `armv7l`).
//!
//! `PlatformKey::new` always normalizes and normalization is idempotent, so
//! keys built from user input, config files and the host compare equal.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlatformKey {
    os: String,
    arch: String,
}

impl PlatformKey {
    /// Builds a key from possibly aliased names (`macos`, `amd64`, `aarch64`, ...).
    pub fn new(os: &str, arch: &str) -> Self {
        PlatformKey {
            os: normalize_os(os),
            arch: normalize_arch(arch),
        }
    }

    /// Builds a key keeping the architecture label as reported (only lower-cased).
    /// Used when the platform identifier runs with normalization disabled.
    pub fn raw(os: &str, arch: &str) -> Self {
        PlatformKey {
            os: normalize_os(os),
            arch: arch.trim().to_lowercase(),
        }
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// Returns a copy with overrides applied. Empty overrides are ignored.
    pub fn with_overrides(&self, os: Option<&str>, arch: Option<&str>) -> Self {
        let os = os.filter(|s| !s.trim().is_empty()).unwrap_or(&self.os);
        let arch = arch.filter(|s| !s.trim().is_empty()).unwrap_or(&self.arch);
        PlatformKey::new(os, arch)
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Maps OS spellings onto `linux`, `windows` or `darwin`; anything else is lower-cased as-is.
pub fn normalize_os(os: &str) -> String {
    match os.trim().to_lowercase().as_str() {
        "darwin" | "macos" | "macosx" | "osx" | "apple-darwin" => "darwin".to_string(),
        "windows" | "win32" | "win64" => "windows".to_string(),
        "linux" => "linux".to_string(),
        other => other.to_string(),
    }
}

/// Collapses vendor aliases: `x64`/`amd64` become `x86_64`, `aarch64` becomes `arm64`.
pub fn normalize_arch(arch: &str) -> String {
    match arch.trim().to_lowercase().as_str() {
        "x64" | "amd64" | "x86_64" => "x86_64".to_string(),
        "aarch64" | "arm64" => "arm64".to_string(),
        other => other.to_string(),
    }
}
