// The version catalog: every LilyPond release this crate knows how to install,
// and the download URL of each per-platform build.
//
// The table is immutable once built. Historical URLs never change, so new
// releases are added as new entries and nothing is edited in place.

use crate::error::{Error, Result};
use crate::schemas::platform::PlatformKey;
use crate::schemas::version::Version;
use crate::log_debug;
use std::collections::BTreeMap;

/// Recommendation printed when a known version has no build for Apple silicon.
pub const DARWIN_ARM64_ALTERNATIVE: &str =
    "No official build exists for macOS on arm64; install lilypond via homebrew (`brew install lilypond`) instead";

const GITLAB_RELEASES: &str = "https://gitlab.com/lilypond/lilypond/-/releases";

/// Version -> platform -> download URL.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: BTreeMap<Version, BTreeMap<PlatformKey, String>>,
}

impl Catalog {
    /// Builds a catalog, rejecting versions without any platform.
    /// An empty table is rejected as well since `latest()` must always exist.
    pub fn new(entries: BTreeMap<Version, BTreeMap<PlatformKey, String>>) -> Result<Self> {
        if let Some((version, _)) = entries.iter().find(|(_, urls)| urls.is_empty()) {
            return Err(Error::EmptyCatalogEntry(*version));
        }
        if entries.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        Ok(Catalog { entries })
    }

    /// The releases published on GitLab for the three desktop platforms.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        for version in [
            Version::new(2, 24, 1),
            Version::new(2, 24, 3),
            Version::new(2, 24, 4),
        ] {
            entries.insert(version, gitlab_release_urls(version));
        }
        Catalog { entries }
    }

    /// The greatest version in the catalog.
    pub fn latest(&self) -> Version {
        // `new` and `builtin` both guarantee at least one entry.
        self.entries
            .keys()
            .next_back()
            .copied()
            .unwrap_or(Version::new(0, 0, 0))
    }

    pub fn contains(&self, version: Version) -> bool {
        self.entries.contains_key(&version)
    }

    /// Resolves the download URL, telling an unknown version apart from a
    /// known version without a build for `platform`.
    pub fn url_for(&self, version: Version, platform: &PlatformKey) -> Result<&str> {
        let urls = self.entries.get(&version).ok_or_else(|| Error::UnknownVersion {
            version,
            available: self.entries.keys().copied().collect(),
        })?;

        match urls.get(platform) {
            Some(url) => {
                log_debug!("[Catalog] {} for {} -> {}", version, platform, url);
                Ok(url.as_str())
            }
            None => Err(Error::UnsupportedPlatform {
                version,
                platform: platform.clone(),
                supported: urls.keys().cloned().collect(),
                alternative: alternative_for(platform),
            }),
        }
    }

    /// Every version with the platforms it supports, ascending.
    pub fn all_versions(&self) -> Vec<(Version, Vec<PlatformKey>)> {
        self.entries
            .iter()
            .map(|(version, urls)| (*version, urls.keys().cloned().collect()))
            .collect()
    }

    /// Versions that publish a build for `platform`, ascending.
    pub fn versions_for(&self, platform: &PlatformKey) -> Result<Vec<Version>> {
        let versions: Vec<Version> = self
            .entries
            .iter()
            .filter(|(_, urls)| urls.contains_key(platform))
            .map(|(version, _)| *version)
            .collect();
        if versions.is_empty() {
            return Err(Error::InvalidPlatform(platform.clone()));
        }
        Ok(versions)
    }

    pub fn platforms_for(&self, version: Version) -> Vec<PlatformKey> {
        self.entries
            .get(&version)
            .map(|urls| urls.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}

fn gitlab_release_urls(version: Version) -> BTreeMap<PlatformKey, String> {
    let base = format!("{GITLAB_RELEASES}/v{version}/downloads/lilypond-{version}");
    BTreeMap::from([
        (
            PlatformKey::new("windows", "x86_64"),
            format!("{base}-mingw-x86_64.zip"),
        ),
        (
            PlatformKey::new("linux", "x86_64"),
            format!("{base}-linux-x86_64.tar.gz"),
        ),
        (
            PlatformKey::new("darwin", "x86_64"),
            format!("{base}-darwin-x86_64.tar.gz"),
        ),
    ])
}

fn alternative_for(platform: &PlatformKey) -> Option<String> {
    (platform.os() == "darwin" && platform.arch() == "arm64")
        .then(|| DARWIN_ARM64_ALTERNATIVE.to_string())
}
