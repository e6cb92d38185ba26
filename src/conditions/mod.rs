//! Environment predicates and the condition-set matcher.
pub mod predicates;
pub mod version;

use std::fmt;

use crate::config::ConditionSet;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;

pub use version::{compare_versions, extract_version, version_meets_constraint};

/// Evaluates [`ConditionSet`]s against one detected environment.
pub struct Matcher<'a> {
    platform: &'a Platform,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl fmt::Debug for Matcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("platform", self.platform)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl<'a> Matcher<'a> {
    /// Create a matcher for `platform`, probing programs through `executor`.
    #[must_use]
    pub const fn new(platform: &'a Platform, executor: &'a dyn Executor, log: &'a dyn Log) -> Self {
        Self {
            platform,
            executor,
            log,
        }
    }

    /// Whether every populated category of `conditions` holds.
    ///
    /// An absent or empty set always matches. Categories are checked in a
    /// fixed order and evaluation stops at the first failure, so version
    /// probes only run when the cheaper checks pass.
    #[must_use]
    pub fn matches(&self, conditions: Option<&ConditionSet>) -> bool {
        let Some(set) = conditions.filter(|set| !set.is_empty()) else {
            return true;
        };
        predicates::matches_os(&set.os, self.platform)
            && predicates::matches_distro(&set.distro, self.platform)
            && predicates::matches_executables(&set.executable, self.executor)
            && predicates::matches_executable_versions(
                &set.executable_version,
                self.executor,
                self.log,
            )
            && predicates::matches_user(&set.user, self.platform)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;
    use crate::logging::MemoryLog;
    use std::collections::BTreeMap;

    fn set(os: &[&str], user: &[&str]) -> ConditionSet {
        ConditionSet {
            os: os.iter().map(ToString::to_string).collect(),
            user: user.iter().map(ToString::to_string).collect(),
            ..ConditionSet::default()
        }
    }

    #[test]
    fn absent_or_empty_set_always_matches() {
        let exec = MockExecutor::new();
        let log = MemoryLog::new();
        for platform in [
            Platform::new("linux", None, None),
            Platform::new("darwin", None, Some("bob")),
            Platform::new("windows", None, None),
        ] {
            let m = Matcher::new(&platform, &exec, &log);
            assert!(m.matches(None));
            assert!(m.matches(Some(&ConditionSet::default())));
        }
    }

    #[test]
    fn categories_are_anded() {
        let platform = Platform::new("linux", Some("arch"), Some("alice"));
        let exec = MockExecutor::new();
        let log = MemoryLog::new();
        let m = Matcher::new(&platform, &exec, &log);
        assert!(m.matches(Some(&set(&["linux"], &["alice"]))));
        assert!(!m.matches(Some(&set(&["linux"], &["bob"]))));
        assert!(!m.matches(Some(&set(&["darwin"], &["alice"]))));
    }

    #[test]
    fn entries_within_category_are_ored() {
        let platform = Platform::new("linux", None, Some("alice"));
        let exec = MockExecutor::new();
        let log = MemoryLog::new();
        let m = Matcher::new(&platform, &exec, &log);
        assert!(m.matches(Some(&set(&["darwin", "linux"], &["bob", "alice"]))));
    }

    #[test]
    fn version_probe_skipped_when_os_fails() {
        let platform = Platform::new("linux", None, None);
        let exec = MockExecutor::new().with_program("tmux");
        let log = MemoryLog::new();
        let m = Matcher::new(&platform, &exec, &log);
        let conditions = ConditionSet {
            os: vec!["darwin".to_string()],
            executable_version: BTreeMap::from([("tmux".to_string(), ">=3.0".to_string())]),
            ..ConditionSet::default()
        };
        assert!(!m.matches(Some(&conditions)));
        assert!(exec.calls().is_empty());
    }
}
