// Core of `lilyponddist`: catalog, installation store, installer and the
// accessor built on top of them.

/// The known releases and their per-platform download URLs.
pub mod catalog;
/// Scans the installation root for verified `lilypond-<version>` entries.
pub mod store;
/// Advisory lock serializing mutations of the installation root.
pub mod install_lock;
/// The install state machine.
pub mod installer;
/// Post-install touch of the Guile bytecode caches.
pub mod cache_repair;
/// Runs `lilypond --version`.
pub mod version_query;
/// The public facade returning ready-to-run executables.
pub mod accessor;
/// Default locations and `~` expansion.
pub mod paths;
/// Reads `config.yaml` into `Settings`.
pub mod config_loading;
/// Fetching, archive expansion, platform detection and progress display.
pub mod utilities;
