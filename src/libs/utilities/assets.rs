// The fetcher collaborator: given a URL and a destination directory, puts the
// payload on disk under the URL's final path segment.
//
// `Fetcher` is the seam the installer depends on; `HttpFetcher` is the ureq
// implementation used outside of tests.

use crate::error::{Error, Result};
use crate::libs::utilities::progress::download_bar;
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Per-call knobs passed down from the installer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub show_progress: bool,
    /// Reuse a file already present under the destination name instead of downloading again.
    pub skip_if_exists: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            show_progress: true,
            skip_if_exists: true,
        }
    }
}

pub trait Fetcher {
    /// Retrieves `url` into `dest_dir` and returns the path of the payload.
    fn fetch(&self, url: &str, dest_dir: &Path, options: &FetchOptions) -> Result<PathBuf>;
}

/// Blocking HTTP(S) fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("lilyponddist/", env!("CARGO_PKG_VERSION")))
            .timeout_connect(Duration::from_secs(30))
            .build();
        HttpFetcher { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        HttpFetcher::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest_dir: &Path, options: &FetchOptions) -> Result<PathBuf> {
        let file_name = file_name_from_url(url)?;
        let dest = dest_dir.join(&file_name);

        if dest.exists() {
            if options.skip_if_exists {
                log_warn!("[Fetch] Destination {} already exists, no need to download", dest.display());
                return Ok(dest);
            }
            log_warn!("[Fetch] Destination {} already exists, overwriting", dest.display());
            fs::remove_file(&dest)?;
        }
        fs::create_dir_all(dest_dir)?;

        if options.show_progress {
            log_info!("[Fetch] Downloading {}", url.blue());
        } else {
            log_debug!("[Fetch] Downloading {}", url.blue());
        }
        self.download_file(url, &dest, &file_name, options.show_progress)?;
        log_info!("[Fetch]    ... saved to {}", dest.display().to_string().green());
        Ok(dest)
    }
}

impl HttpFetcher {
    // The body is streamed into a temporary file next to `dest` and renamed into
    // place once complete, so an interrupted transfer never occupies `dest`.
    fn download_file(&self, url: &str, dest: &Path, label: &str, show_progress: bool) -> Result<()> {
        let download_error = |reason: String| Error::Download {
            url: url.to_string(),
            reason,
        };

        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| download_error(e.to_string()))?;

        let total = response
            .header("Content-Length")
            .and_then(|len| len.trim().parse::<u64>().ok());
        log_debug!("[Fetch] HTTP {} for {}, length {:?}", response.status(), url, total);

        let staging_dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut staged = NamedTempFile::new_in(staging_dir)?;
        let mut reader = response.into_reader();

        let copied = if show_progress {
            let bar = download_bar(total, label);
            let copied = io::copy(&mut bar.wrap_read(&mut reader), staged.as_file_mut());
            match &copied {
                Ok(_) => bar.finish(),
                Err(_) => bar.abandon(),
            }
            copied
        } else {
            io::copy(&mut reader, staged.as_file_mut())
        };
        let bytes = copied.map_err(|e| download_error(e.to_string()))?;

        if let Some(expected) = total {
            if bytes != expected {
                return Err(download_error(format!(
                    "received {bytes} bytes, expected {expected}"
                )));
            }
        }

        staged.persist(dest).map_err(|e| Error::Io(e.error))?;
        log_debug!("[Fetch] Wrote {} bytes to {}", bytes, dest.display());
        Ok(())
    }
}

/// The last path segment of `url`, without query string or fragment.
pub fn file_name_from_url(url: &str) -> Result<String> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let path = without_fragment.split('?').next().unwrap_or(without_fragment);
    match path.trim_end_matches('/').rsplit('/').next() {
        Some(name) if !name.is_empty() && !name.contains(':') => Ok(name.to_string()),
        _ => Err(Error::Download {
            url: url.to_string(),
            reason: "URL has no file name".to_string(),
        }),
    }
}
