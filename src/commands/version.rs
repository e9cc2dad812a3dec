// Prints the version of the `lilyponddist` tool itself, as compiled in.

/// Shows the tool version. The LilyPond version is reported by `status`.
pub fn run() {
    println!("lilyponddist {}", env!("CARGO_PKG_VERSION"));
}
