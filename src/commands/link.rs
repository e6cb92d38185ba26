//! `dloom link`.
use anyhow::Result;

use crate::cli::{GlobalOpts, PackageArgs};
use crate::logging::Logger;

/// Run the link command.
///
/// # Errors
///
/// Returns an error if configuration loading fails or any package fails
/// to link.
pub fn run(global: &GlobalOpts, args: &PackageArgs, log: &Logger) -> Result<()> {
    super::run_packages(global, &args.packages, log, |engine, packages, keep_going| {
        engine.link_packages(packages, keep_going)
    })
}
