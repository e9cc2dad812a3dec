// The archive expander collaborator. LilyPond ships exactly two archive kinds:
// `.tar.gz` for Linux and macOS, `.zip` for Windows. The format is decided by
// the file name suffix alone.

use crate::error::{Error, Result};
use crate::{log_debug, log_error};
use colored::Colorize;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::Path;
use tar::Archive;
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// Detects the format from the suffix (`.zip`, `.tar.gz`, `.tgz`; case-insensitive).
    pub fn detect(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".zip") {
            Ok(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(ArchiveFormat::TarGz)
        } else {
            Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    }
}

pub trait ArchiveExpander {
    /// Expands `archive` so that its top-level entries land directly in `dest_dir`.
    fn expand(&self, archive: &Path, dest_dir: &Path) -> Result<()>;
}

/// Expands zip and gzip-compressed tar archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveExtractor;

impl ArchiveExpander for ArchiveExtractor {
    fn expand(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        let format = ArchiveFormat::detect(archive).inspect_err(|_| {
            log_error!("[Archive] File format of {} not supported", archive.display().to_string().red());
        })?;
        log_debug!(
            "[Archive] Extracting {:?} archive {} into {}",
            format,
            archive.display().to_string().blue(),
            dest_dir.display().to_string().cyan()
        );

        fs::create_dir_all(dest_dir)?;
        let archive_error = |reason: String| Error::Archive {
            path: archive.to_path_buf(),
            reason,
        };

        match format {
            ArchiveFormat::Zip => {
                let file = File::open(archive)?;
                let mut zip = ZipArchive::new(file).map_err(|e| archive_error(e.to_string()))?;
                zip.extract(dest_dir).map_err(|e| archive_error(e.to_string()))?;
            }
            ArchiveFormat::TarGz => {
                let file = File::open(archive)?;
                let mut tar = Archive::new(GzDecoder::new(file));
                tar.set_preserve_permissions(true);
                tar.unpack(dest_dir).map_err(|e| archive_error(e.to_string()))?;
            }
        }

        log_debug!("[Archive] Contents available at {}", dest_dir.display().to_string().green());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn detects_supported_suffixes() {
        assert_eq!(ArchiveFormat::detect(Path::new("a/lilypond-2.24.3-mingw-x86_64.zip")).unwrap(), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::detect(Path::new("lilypond.TAR.GZ")).unwrap(), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::detect(Path::new("lilypond.tgz")).unwrap(), ArchiveFormat::TarGz);
    }

    #[test]
    fn other_suffixes_are_unsupported() {
        for name in ["lilypond.tar.xz", "lilypond.tar", "lilypond.gz", "lilypond.dmg", "lilypond"] {
            assert!(
                matches!(ArchiveFormat::detect(Path::new(name)), Err(Error::UnsupportedFormat { .. })),
                "{name} should be unsupported"
            );
        }
    }

    #[test]
    fn unsupported_archive_is_rejected_before_touching_dest() {
        let tmp = TempDir::new().unwrap();
        let payload = tmp.path().join("lilypond.tar.xz");
        fs::write(&payload, b"xz").unwrap();
        let dest = tmp.path().join("root");
        let err = ArchiveExtractor.expand(&payload, &dest).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn expands_tar_gz_into_dest() {
        let tmp = TempDir::new().unwrap();
        let payload = tmp.path().join("pkg.tar.gz");
        {
            let encoder = GzEncoder::new(File::create(&payload).unwrap(), Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let data = b"hello";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, "lilypond-2.24.3/README", &data[..]).unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }
        let dest = tmp.path().join("root");
        ArchiveExtractor.expand(&payload, &dest).unwrap();
        assert_eq!(fs::read(dest.join("lilypond-2.24.3/README")).unwrap(), b"hello");
    }

    #[test]
    fn expands_zip_into_dest() {
        let tmp = TempDir::new().unwrap();
        let payload = tmp.path().join("pkg.zip");
        {
            let mut writer = zip::ZipWriter::new(File::create(&payload).unwrap());
            writer
                .start_file("lilypond-2.24.3/bin/lilypond.exe", zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(b"MZ").unwrap();
            writer.finish().unwrap();
        }
        let dest = tmp.path().join("root");
        ArchiveExtractor.expand(&payload, &dest).unwrap();
        assert_eq!(fs::read(dest.join("lilypond-2.24.3/bin/lilypond.exe")).unwrap(), b"MZ");
    }

    #[test]
    fn corrupt_archive_reports_archive_error() {
        let tmp = TempDir::new().unwrap();
        let payload = tmp.path().join("broken.zip");
        fs::write(&payload, b"not a zip").unwrap();
        assert!(matches!(
            ArchiveExtractor.expand(&payload, &tmp.path().join("root")),
            Err(Error::Archive { .. })
        ));
    }
}
