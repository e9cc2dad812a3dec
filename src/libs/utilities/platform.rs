// Platform identification: turns what the host reports about itself into the
// normalized `PlatformKey` the catalog is indexed by.
//
// Hosts are not consistent about this. A 32-bit build on a 64-bit kernel reports
// the kernel's machine, Windows calls x86_64 "AMD64", macOS universal builds report
// "universal" instead of a machine. The correction table in `identify_from` fixes
// those cases before the final alias pass.

use crate::log_debug;
use crate::schemas::platform::PlatformKey;
use colored::Colorize;
use std::env::consts;
#[cfg(not(windows))]
use std::process::Command;

/// The raw signals the identifier works from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSignals {
    /// Reported OS family, e.g. "Linux", "Darwin", "Windows", "CYGWIN_NT-10.0".
    pub system: String,
    /// Architecture label of the running build (Windows style: "amd64", "win32", "arm64").
    pub build_machine: String,
    /// Literal hardware architecture, e.g. from `uname -m`.
    pub machine: String,
    /// Pointer width of the running process.
    pub is_64bit: bool,
}

impl HostSignals {
    /// Collects the signals for the current process.
    pub fn probe() -> Self {
        let signals = HostSignals {
            system: reported_system(),
            build_machine: build_machine_label(),
            machine: literal_machine().unwrap_or_else(|| consts::ARCH.to_string()),
            is_64bit: cfg!(target_pointer_width = "64"),
        };
        log_debug!("[Platform] Host signals: {:?}", signals);
        signals
    }
}

/// Identifies the host platform, with vendor aliases collapsed.
pub fn identify() -> PlatformKey {
    let key = identify_from(&HostSignals::probe(), true);
    log_debug!("[Platform] Identified host platform as {}", key.to_string().cyan());
    key
}

/// Applies the correction table to a set of signals. Never fails: combinations
/// nobody publishes builds for are reported later, when no catalog URL matches.
///
/// With `normalize` off the architecture label is returned as corrected but
/// without the final `x64`/`amd64`/`aarch64` alias pass.
pub fn identify_from(signals: &HostSignals, normalize: bool) -> PlatformKey {
    let mut system = signals.system.trim().to_lowercase();
    if system == "macos" {
        system = "darwin".to_string();
    }
    let literal = signals.machine.trim().to_lowercase();
    let mut machine = signals.build_machine.trim().to_lowercase();

    match system.as_str() {
        "darwin" => {
            // multi-architecture builds do not name a machine
            if ["fat", "intel", "universal"].iter().any(|m| machine.contains(m)) {
                machine = literal.clone();
            }
        }
        "linux" => {
            if !signals.is_64bit {
                match machine.as_str() {
                    "x86_64" => machine = "i686".to_string(),
                    "aarch64" => machine = "armv7l".to_string(),
                    _ => {}
                }
            }
        }
        "windows" => match machine.as_str() {
            "amd64" => machine = "x64".to_string(),
            "win32" => {
                machine = if signals.is_64bit {
                    literal.clone()
                } else {
                    "x86".to_string()
                }
            }
            _ => {}
        },
        _ => {}
    }

    if !signals.is_64bit && (machine == "x86_64" || machine == "amd64") {
        machine = if ["cygwin", "mingw", "msys"].iter().any(|env| system.contains(env)) {
            "i686".to_string()
        } else {
            "i386".to_string()
        };
    }

    if normalize {
        PlatformKey::new(&system, &machine)
    } else {
        PlatformKey::raw(&system, &machine)
    }
}

fn reported_system() -> String {
    match consts::OS {
        "macos" => "Darwin".to_string(),
        "linux" => "Linux".to_string(),
        "windows" => "Windows".to_string(),
        other => other.to_string(),
    }
}

// The label the running binary was built for, spelled the way each OS family's
// tooling spells it.
fn build_machine_label() -> String {
    let arch = consts::ARCH;
    let label = if cfg!(windows) {
        match arch {
            "x86_64" => "amd64",
            "x86" => "win32",
            "aarch64" => "arm64",
            other => other,
        }
    } else if cfg!(target_os = "macos") {
        match arch {
            "aarch64" => "arm64",
            other => other,
        }
    } else {
        match arch {
            "x86" => "i686",
            other => other,
        }
    };
    label.to_string()
}

#[cfg(windows)]
fn literal_machine() -> Option<String> {
    // A 32-bit process on 64-bit Windows sees the emulated architecture in
    // PROCESSOR_ARCHITECTURE; the real one is in PROCESSOR_ARCHITEW6432.
    std::env::var("PROCESSOR_ARCHITEW6432")
        .or_else(|_| std::env::var("PROCESSOR_ARCHITECTURE"))
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

#[cfg(not(windows))]
fn literal_machine() -> Option<String> {
    let output = Command::new("uname").arg("-m").output().ok()?;
    if !output.status.success() {
        log_debug!("[Platform] `uname -m` exited with {}", output.status);
        return None;
    }
    let machine = String::from_utf8_lossy(&output.stdout).trim().to_lowercase();
    (!machine.is_empty()).then_some(machine)
}
