//! Core logging types: package entries, status, and the [`Log`] trait.

/// Package result for summary reporting.
#[derive(Debug, Clone)]
pub struct PackageEntry {
    /// Package name.
    pub name: String,
    /// Final status of the package.
    pub status: PackageStatus,
    /// Optional detail message (e.g., counts or error description).
    pub message: Option<String>,
}

/// Status of a processed package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// Package was linked or unlinked.
    Ok,
    /// Package conditions did not match the current environment.
    NotApplicable,
    /// Package ran in dry-run mode; no changes were applied.
    DryRun,
    /// Package walk aborted with an error.
    Failed,
}

/// Abstraction over logging backends.
///
/// Both [`Logger`](super::logger::Logger) (tracing output) and
/// [`MemoryLog`](super::memory::MemoryLog) (captured entries) implement this
/// trait, so engine code can log without knowing where output ends up.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a package result for the summary.
    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>);

    /// Log a detail line: `info` when `verbose` is set, `debug` otherwise.
    ///
    /// The engines call this with the resolved per-file verbose setting.
    fn detail(&self, verbose: bool, msg: &str) {
        if verbose {
            self.info(msg);
        } else {
            self.debug(msg);
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn package_status_equality() {
        assert_eq!(PackageStatus::Ok, PackageStatus::Ok);
        assert_ne!(PackageStatus::Ok, PackageStatus::Failed);
        assert_ne!(PackageStatus::NotApplicable, PackageStatus::DryRun);
    }

    #[test]
    fn package_entry_clone() {
        let entry = PackageEntry {
            name: "vim".to_string(),
            status: PackageStatus::Ok,
            message: Some("2 linked".to_string()),
        };
        let cloned = entry.clone();
        assert_eq!(cloned.name, entry.name);
        assert_eq!(cloned.status, entry.status);
        assert_eq!(cloned.message, entry.message);
    }
}
