//! `dloom unlink`: remove owned links and restore backups.
use anyhow::Result;

use crate::cli::{GlobalOpts, PackageArgs};
use crate::logging::Logger;

/// Run the unlink command.
///
/// # Errors
///
/// Returns an error if configuration loading fails or any package fails
/// to unlink.
pub fn run(global: &GlobalOpts, args: &PackageArgs, log: &Logger) -> Result<()> {
    super::run_packages(global, &args.packages, log, |engine, packages, keep_going| {
        engine.unlink_packages(packages, keep_going)
    })
}
