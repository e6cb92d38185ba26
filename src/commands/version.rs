//! Command: print version information.

/// Version string: `DLOOM_VERSION` from the build script, else the crate
/// version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DLOOM_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the dloom version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("dloom {}", version());
}
