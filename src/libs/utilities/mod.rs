// I/O helpers the core delegates to. Each sits behind a narrow function or
// trait so the installer can be exercised without a network or real archives.

// Declare the `assets` module: the `Fetcher` trait and the HTTP fetcher.
pub mod assets;
// Declare the `compression` module: the `ArchiveExpander` trait and zip/tar.gz support.
pub mod compression;
// Declare the `platform` module: host OS/architecture identification.
pub mod platform;
// Declare the `progress` module: download progress bars.
pub mod progress;
