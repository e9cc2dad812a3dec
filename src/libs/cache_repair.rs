// Post-install repair of LilyPond's precompiled Guile bytecode.
//
// Archives do not always preserve modification times, and Guile recompiles
// (or refuses to load) a `.go` file that looks older than its `.scm` source.
// Touching every `.go` file after expansion makes the caches current again.
// Nothing here is fatal: a missing subtree only means a slower first run.

use crate::schemas::version::Version;
use crate::{log_info, log_warn};
use colored::Colorize;
use filetime::FileTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Outcome of one repair pass over an installed entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RepairReport {
    /// Number of `.go` files whose modification time was refreshed.
    pub touched: usize,
    /// Cache subtrees that were expected but not found.
    pub missing: Vec<PathBuf>,
}

/// Refreshes the modification time of every `*.go` file under the Guile cache
/// (`lib/guile/<guile version>/ccache`) and the LilyPond cache
/// (`lib/lilypond/<version>/ccache/lily`) of the entry at `entry_dir`.
pub fn warm_bytecode_caches(entry_dir: &Path, version: Version) -> RepairReport {
    let mut report = RepairReport::default();
    let now = SystemTime::now();

    let guile_lib = entry_dir.join("lib").join("guile");
    let guile_caches = guile_cache_dirs(&guile_lib);
    if guile_caches.is_empty() {
        log_warn!(
            "[Repair] No guile bytecode cache under {}",
            guile_lib.display().to_string().yellow()
        );
        report.missing.push(guile_lib);
    }
    for cache in guile_caches {
        let touched = touch_bytecode(&cache, now);
        log_info!("[Repair] Fixed times of lilypond's guile cache {} ({} files)", cache.display(), touched);
        report.touched += touched;
    }

    let lily_cache = entry_dir
        .join("lib")
        .join("lilypond")
        .join(version.to_string())
        .join("ccache")
        .join("lily");
    if lily_cache.is_dir() {
        let touched = touch_bytecode(&lily_cache, now);
        log_info!("[Repair] Fixed times of lilypond's binaries at {} ({} files)", lily_cache.display(), touched);
        report.touched += touched;
    } else {
        log_warn!(
            "[Repair] No lilypond bytecode cache at {}",
            lily_cache.display().to_string().yellow()
        );
        report.missing.push(lily_cache);
    }

    report
}

// lib/guile/2.2/ccache today; the Guile series is not pinned.
fn guile_cache_dirs(guile_lib: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(guile_lib) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path().join("ccache"))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn touch_bytecode(dir: &Path, now: SystemTime) -> usize {
    let mut touched = 0;
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }
        match touch(path, now) {
            Ok(()) => touched += 1,
            Err(e) => log_warn!(
                "[Repair] Could not touch {}: {}",
                path.display().to_string().yellow(),
                e
            ),
        }
    }
    touched
}

// Only the modification time changes; the file is never opened, so read-only
// caches owned by the user are refreshed too.
fn touch(path: &Path, now: SystemTime) -> io::Result<()> {
    filetime::set_file_mtime(path, FileTime::from_system_time(now))
}
