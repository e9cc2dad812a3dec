// Fixtures shared by the integration tests: a fetcher that fabricates real
// LilyPond-shaped archives instead of touching the network.
#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use lilyponddist::libs::utilities::assets::file_name_from_url;
use lilyponddist::{
    ArchiveExtractor, Catalog, Error, FetchOptions, Fetcher, InstallRequest, Installer,
    InstallerOptions, LilypondDist, PlatformKey, Result, Version,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Modification time stamped on every archive member (1970-01-12).
pub const OLD_MTIME: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Write a well-formed archive for the version in the URL.
    Archive,
    /// Report success without writing anything.
    WriteNothing,
    /// Fail like an unreachable server.
    Fail,
}

pub struct FakeFetcher {
    mode: FetchMode,
    calls: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn new(mode: FetchMode) -> Self {
        FakeFetcher {
            mode,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str, dest_dir: &Path, _: &FetchOptions) -> Result<PathBuf> {
        self.calls.borrow_mut().push(url.to_string());
        let name = file_name_from_url(url)?;
        let dest = dest_dir.join(&name);
        match self.mode {
            FetchMode::WriteNothing => {}
            FetchMode::Fail => {
                return Err(Error::Download {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            FetchMode::Archive => {
                let version = version_in(&name);
                if name.ends_with(".zip") {
                    write_zip(&dest, version)?;
                } else if name.ends_with(".tar.gz") {
                    write_tar_gz(&dest, version)?;
                } else {
                    fs::write(&dest, b"opaque payload")?;
                }
            }
        }
        Ok(dest)
    }
}

/// `lilypond-2.24.3-linux-x86_64.tar.gz` -> 2.24.3
pub fn version_in(file_name: &str) -> Version {
    file_name
        .trim_start_matches("lilypond-")
        .split('-')
        .next()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Version::new(0, 0, 0))
}

fn banner_script(version: Version) -> String {
    format!("#!/bin/sh\necho 'GNU LilyPond {version} (running Guile 2.2)'\n")
}

/// Archive members as (path, unix mode, contents).
fn members(version: Version, executable: &str) -> Vec<(String, u32, Vec<u8>)> {
    let top = format!("lilypond-{version}");
    vec![
        (format!("{top}/bin/{executable}"), 0o755, banner_script(version).into_bytes()),
        (format!("{top}/lib/guile/2.2/ccache/ice-9/boot-9.go"), 0o644, b"guile bytecode".to_vec()),
        (
            format!("{top}/lib/lilypond/{version}/ccache/lily/lily.go"),
            0o644,
            b"lily bytecode".to_vec(),
        ),
        (format!("{top}/share/lilypond/{version}/ly/init.ly"), 0o644, b"\\version".to_vec()),
    ]
}

pub fn write_tar_gz(dest: &Path, version: Version) -> Result<()> {
    let encoder = GzEncoder::new(File::create(dest)?, Compression::fast());
    let mut builder = tar::Builder::new(encoder);
    for (path, mode, data) in members(version, "lilypond") {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_mtime(OLD_MTIME);
        header.set_cksum();
        builder.append_data(&mut header, path, data.as_slice())?;
    }
    builder.into_inner()?.finish()?;
    Ok(())
}

pub fn write_zip(dest: &Path, version: Version) -> Result<()> {
    let mut writer = zip::ZipWriter::new(File::create(dest)?);
    for (path, mode, data) in members(version, "lilypond.exe") {
        let options = zip::write::FileOptions::default().unix_permissions(mode);
        writer
            .start_file(path, options)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        writer.write_all(&data)?;
    }
    writer
        .finish()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(())
}

pub fn linux() -> PlatformKey {
    PlatformKey::new("linux", "x86_64")
}

/// A catalog with the given versions, each published for `platform` only.
pub fn catalog_for(platform: &PlatformKey, versions: &[Version], suffix: &str) -> Catalog {
    let entries = versions
        .iter()
        .map(|v| {
            let url = format!("https://example.invalid/dist/lilypond-{v}-{platform}{suffix}");
            (*v, BTreeMap::from([(platform.clone(), url)]))
        })
        .collect();
    Catalog::new(entries).expect("fixture catalog is valid")
}

/// Scratch layout: `<tmp>/root` and `<tmp>/downloads`.
pub struct Sandbox {
    pub tmp: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Sandbox {
            tmp: TempDir::new().expect("temp dir"),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.tmp.path().join("root")
    }

    pub fn downloads(&self) -> PathBuf {
        self.tmp.path().join("downloads")
    }

    pub fn options(&self) -> InstallerOptions {
        InstallerOptions {
            download_dir: self.downloads(),
            show_progress: false,
            ..Default::default()
        }
    }

    pub fn dist(
        &self,
        catalog: Catalog,
        host: PlatformKey,
        fetcher: FakeFetcher,
        options: InstallerOptions,
        auto_install: bool,
    ) -> LilypondDist<FakeFetcher, ArchiveExtractor> {
        self.dist_with_defaults(catalog, host, fetcher, options, auto_install, InstallRequest::default())
    }

    /// Like `dist`, with `defaults` applied to calls that do not name a request.
    pub fn dist_with_defaults(
        &self,
        catalog: Catalog,
        host: PlatformKey,
        fetcher: FakeFetcher,
        options: InstallerOptions,
        auto_install: bool,
        defaults: InstallRequest,
    ) -> LilypondDist<FakeFetcher, ArchiveExtractor> {
        let installer = Installer::with_collaborators(
            catalog,
            self.root(),
            host,
            fetcher,
            ArchiveExtractor,
            options,
        );
        LilypondDist::with_installer(installer, auto_install, defaults)
    }
}
