use lilyponddist::libs::utilities::platform::{HostSignals, identify_from};

/// Prints `os-arch` for this host, e.g. `linux-x86_64`.
pub fn run(raw: bool) {
    println!("{}", identify_from(&HostSignals::probe(), !raw));
}
