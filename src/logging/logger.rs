//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, PackageEntry, PackageStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
///
/// The `record_package` method is **not** included because its signature
/// differs from the `fn(&self, &str)` pattern shared by the display methods.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Messages go through [`tracing`]; the subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) renders them on
/// the console and appends them to
/// `$XDG_CACHE_HOME/dloom/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    packages: Mutex<Vec<PackageEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary. The file
    /// itself is created by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            packages: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return a clone of all recorded package entries.
    #[must_use]
    pub fn package_entries(&self) -> Vec<PackageEntry> {
        self.packages.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a package result for the summary.
    pub fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.packages.lock() {
            guard.push(PackageEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed packages.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.packages.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|p| p.status == PackageStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded packages.
    pub fn print_summary(&self) {
        let packages = self.package_entries();
        if packages.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut not_applicable = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for package in &packages {
            let (icon, color) = match package.status {
                PackageStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                PackageStatus::NotApplicable => {
                    not_applicable += 1;
                    ("·", "\x1b[2m")
                }
                PackageStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                PackageStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = package
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", package.name));
        }

        let total = ok + not_applicable + dry_run + failed;
        self.info(&format!(
            "{total} packages: \x1b[32m{ok} ok\x1b[0m, \x1b[2m{not_applicable} n/a\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        self.record_package(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn logger_starts_empty() {
        let log = Logger::new("test");
        assert!(log.package_entries().is_empty());
        assert_eq!(log.failure_count(), 0);
    }

    #[test]
    fn record_package_with_message() {
        let log = Logger::new("test");
        log.record_package("vim", PackageStatus::Ok, Some("2 linked"));
        let entries = log.package_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "vim");
        assert_eq!(entries[0].message.as_deref(), Some("2 linked"));
    }

    #[test]
    fn failure_count_returns_correct_count() {
        let log = Logger::new("test");
        log.record_package("a", PackageStatus::Ok, None);
        log.record_package("b", PackageStatus::Failed, Some("error 1"));
        log.record_package("c", PackageStatus::Failed, Some("error 2"));
        log.record_package("d", PackageStatus::NotApplicable, None);
        assert_eq!(log.failure_count(), 2);
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let log = Logger::new("test");
        let log_ref: &dyn Log = &log;
        log_ref.record_package("via-trait", PackageStatus::DryRun, None);
        assert_eq!(log.package_entries().len(), 1);
    }

    #[test]
    fn print_summary_without_packages_is_noop() {
        let log = Logger::new("test");
        log.print_summary();
        assert!(log.package_entries().is_empty());
    }
}
