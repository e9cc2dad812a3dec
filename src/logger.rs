// This file implements the application's logging system.
// It provides macros for different log levels (INFO, WARN, ERROR, DEBUG)
// and handles conditional output, especially for debug messages, with colored terminal output.

use colored::*; // Used for adding color to log prefixes.
use std::fmt;
use std::sync::OnceLock; // Ensures the flags are initialized exactly once.
use std::sync::atomic::{AtomicBool, Ordering}; // For thread-safe, atomic control of the flags.

/// Environment variable that turns on debug logging without going through `init`.
pub const DEBUG_ENV_VAR: &str = "LILYPONDDIST_DEBUG";

/// Severity of a log line. Only used by the macros below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
}

/// Provides convenient logging macros.
/// `#[macro_export]` makes these macros available to the crate and to library users.

// `log_info!` for general progress and informational messages.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => ($crate::logger::emit($crate::logger::Level::Info, format_args!($($arg)*)));
}

// `log_warn!` for non-critical issues or noteworthy conditions.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => ($crate::logger::emit($crate::logger::Level::Warn, format_args!($($arg)*)));
}

// `log_error!` for errors requiring attention.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => ($crate::logger::emit($crate::logger::Level::Error, format_args!($($arg)*)));
}

// `log_debug!` for detailed internal tracing.
// Messages are only printed if debug mode is enabled via `is_debug_enabled()`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logger::is_debug_enabled() {
            $crate::logger::emit($crate::logger::Level::Debug, format_args!($($arg)*));
        }
    };
}

// Global flag to control debug logging, ensured to be initialized once.
static DEBUG_ENABLED: OnceLock<AtomicBool> = OnceLock::new();

/// Initializes the logger, setting the global debug mode.
/// Call once at application startup. Library users that never call it get
/// info/warn/error output, plus debug output when `LILYPONDDIST_DEBUG` is set.
///
/// # Arguments
/// * `debug`: If `true`, enables debug logging; otherwise, only info, warn, and error messages are printed.
pub fn init(debug: bool) {
    let debug = debug || debug_requested_by_env();
    DEBUG_ENABLED
        .get_or_init(|| AtomicBool::new(debug))
        .store(debug, Ordering::Relaxed);

    if debug {
        log_debug!("Logger initialized in DEBUG mode");
    }
}

/// Checks if debug logging is currently enabled.
/// Used primarily by the `log_debug!` macro.
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED
        .get_or_init(|| AtomicBool::new(debug_requested_by_env()))
        .load(Ordering::Relaxed)
}

fn debug_requested_by_env() -> bool {
    std::env::var(DEBUG_ENV_VAR)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Writes one tagged line to stderr. The macros are the intended entry point.
#[doc(hidden)]
pub fn emit(level: Level, args: fmt::Arguments<'_>) {
    let prefix = match level {
        Level::Info => "[INFO]".bright_green(),
        Level::Warn => "[WARN]".bright_yellow(),
        Level::Error => "[ERROR]".bright_red(),
        Level::Debug => "[DEBUG]".dimmed(),
    };
    eprintln!("{} {}", prefix, args);
}
