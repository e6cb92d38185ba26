//! Condition-set schema shared by package and file overrides.
use serde::Deserialize;
use std::collections::BTreeMap;

/// Environment predicates gating a package or a single file.
///
/// Each list is OR-within (any entry may match), and all non-empty
/// categories must hold. `executable` is the exception: every listed
/// program must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConditionSet {
    /// Accepted operating system identifiers.
    pub os: Vec<String>,
    /// Accepted Linux distribution ids (ignored off Linux).
    pub distro: Vec<String>,
    /// Programs that must all resolve on the search path.
    pub executable: Vec<String>,
    /// Program name to version constraint, e.g. `tmux: ">=3.0"`.
    pub executable_version: BTreeMap<String, String>,
    /// Accepted user names.
    pub user: Vec<String>,
}

impl ConditionSet {
    /// Whether no category is populated (vacuously true).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.os.is_empty()
            && self.distro.is_empty()
            && self.executable.is_empty()
            && self.executable_version.is_empty()
            && self.user.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(ConditionSet::default().is_empty());
    }

    #[test]
    fn parses_all_categories() {
        let yaml = r#"
os: [linux, darwin]
distro: [arch]
executable: [git]
executable_version:
  tmux: ">=3.0"
user: [alice]
"#;
        let set: ConditionSet = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(set.os, vec!["linux", "darwin"]);
        assert_eq!(set.distro, vec!["arch"]);
        assert_eq!(set.executable, vec!["git"]);
        assert_eq!(set.executable_version.get("tmux").map(String::as_str), Some(">=3.0"));
        assert_eq!(set.user, vec!["alice"]);
        assert!(!set.is_empty());
    }

    #[test]
    fn partial_set_defaults_missing_categories() {
        let set: ConditionSet = serde_yaml::from_str("user: [bob]").unwrap();
        assert!(set.os.is_empty());
        assert!(set.executable_version.is_empty());
        assert!(!set.is_empty());
    }
}
