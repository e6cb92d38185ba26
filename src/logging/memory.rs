//! In-memory logger that captures entries instead of printing them.
use std::sync::Mutex;

use super::types::{Log, PackageEntry, PackageStatus};

/// Severity or kind of a captured message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Stage header.
    Stage,
    /// Informational line.
    Info,
    /// Debug line.
    Debug,
    /// Warning.
    Warn,
    /// Error.
    Error,
    /// Dry-run action line.
    DryRun,
}

/// Captures log messages in memory.
///
/// Used where output must be inspected afterwards, most notably to assert
/// that a dry run announced every action it skipped.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Level, String)>>,
    packages: Mutex<Vec<PackageEntry>>,
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured messages in emission order.
    #[must_use]
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Messages captured at `level`.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// Whether any message at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }

    /// Recorded package results.
    #[must_use]
    pub fn package_entries(&self) -> Vec<PackageEntry> {
        self.packages.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    fn push(&self, level: Level, msg: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push((level, msg.to_string()));
        }
    }
}

impl Log for MemoryLog {
    fn stage(&self, msg: &str) {
        self.push(Level::Stage, msg);
    }

    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }

    fn debug(&self, msg: &str) {
        self.push(Level::Debug, msg);
    }

    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }

    fn dry_run(&self, msg: &str) {
        self.push(Level::DryRun, msg);
    }

    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.packages.lock() {
            guard.push(PackageEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn captures_messages_in_order() {
        let log = MemoryLog::new();
        log.stage("Linking vim");
        log.dry_run("would link .vimrc");
        log.warn("careful");
        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], (Level::Stage, "Linking vim".to_string()));
        assert_eq!(entries[1].0, Level::DryRun);
        assert_eq!(entries[2].0, Level::Warn);
    }

    #[test]
    fn detail_routes_by_verbosity() {
        let log = MemoryLog::new();
        log.detail(true, "loud");
        log.detail(false, "quiet");
        assert_eq!(log.messages(Level::Info), vec!["loud".to_string()]);
        assert_eq!(log.messages(Level::Debug), vec!["quiet".to_string()]);
    }

    #[test]
    fn contains_matches_substring() {
        let log = MemoryLog::new();
        log.dry_run("would create symlink /t/.vimrc");
        assert!(log.contains(Level::DryRun, ".vimrc"));
        assert!(!log.contains(Level::Info, ".vimrc"));
    }

    #[test]
    fn records_packages() {
        let log = MemoryLog::new();
        log.record_package("vim", PackageStatus::Failed, Some("boom"));
        let pkgs = log.package_entries();
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].status, PackageStatus::Failed);
    }
}
