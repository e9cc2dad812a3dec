// Advisory lock serializing installation-root mutations across processes.
//
// The lock file sits next to the root (`<root>.lock`), not inside it, because a
// wipe-policy install deletes the whole root while the lock is held.

use crate::error::Result;
use crate::log_debug;
use fs4::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Held for the duration of an install or removal; released on drop.
#[derive(Debug)]
pub struct InstallLock {
    file: File,
    path: PathBuf,
}

impl InstallLock {
    /// Blocks until no other process holds the lock for `root`.
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = lock_path_for(root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        log_debug!("[Lock] Waiting for {}", path.display());
        file.lock_exclusive()?;
        log_debug!("[Lock] Acquired {}", path.display());
        Ok(InstallLock { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        // Closing the handle releases the lock as well; unlocking first makes the
        // release immediate on platforms that defer the close.
        let _ = FileExt::unlock(&self.file);
        log_debug!("[Lock] Released {}", self.path.display());
    }
}

/// `<root>.lock`, a sibling of the installation root.
pub fn lock_path_for(root: &Path) -> PathBuf {
    let mut name: OsString = root.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
