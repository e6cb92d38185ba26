//! Package and file override records and their YAML shapes.
use regex::Regex;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::conditions::ConditionSet;

/// Prefix marking a `file_overrides` key as a regular expression.
const REGEX_PREFIX: &str = "regex:";

/// Settings for one package, layered over the global settings.
///
/// Unset fields inherit. An empty directory string is treated as unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageOverride {
    /// Package source directory, replacing `<source_dir>/<package>`.
    #[serde(deserialize_with = "non_empty_path")]
    pub source_dir: Option<PathBuf>,
    /// Target directory for this package's links.
    #[serde(deserialize_with = "non_empty_path")]
    pub target_dir: Option<PathBuf>,
    /// Backup directory for this package's displaced files.
    #[serde(deserialize_with = "non_empty_path")]
    pub backup_dir: Option<PathBuf>,
    /// Tri-state force flag.
    pub force: Option<bool>,
    /// Tri-state verbose flag.
    pub verbose: Option<bool>,
    /// Adds dry-run for this package; `false` cannot clear a global `true`.
    pub dry_run: bool,
    /// Predicates gating the whole package.
    pub conditions: Option<ConditionSet>,
    /// Per-file overrides keyed by name or `regex:` pattern.
    #[serde(rename = "file_overrides")]
    pub files: FileOverrides,
}

/// Settings for the files matched by one `file_overrides` key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileOverride {
    /// Target directory for the matched file.
    #[serde(deserialize_with = "non_empty_path")]
    pub target_dir: Option<PathBuf>,
    /// Replacement leaf name; the relative directory is kept.
    #[serde(deserialize_with = "non_empty_string")]
    pub target_name: Option<String>,
    /// Backup directory for the matched file.
    #[serde(deserialize_with = "non_empty_path")]
    pub backup_dir: Option<PathBuf>,
    /// Tri-state force flag.
    pub force: Option<bool>,
    /// Tri-state verbose flag.
    pub verbose: Option<bool>,
    /// Adds dry-run for the matched file.
    pub dry_run: bool,
    /// Predicates replacing the package's conditions for the matched file.
    pub conditions: Option<ConditionSet>,
}

/// A `file_overrides` key, compiled once at load time.
#[derive(Debug, Clone)]
pub enum FileKey {
    /// Exact file name (or exact relative path).
    Literal(String),
    /// `regex:<pattern>` matched against the relative path.
    Pattern(Regex),
}

impl FromStr for FileKey {
    type Err = regex::Error;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        key.strip_prefix(REGEX_PREFIX).map_or_else(
            || Ok(Self::Literal(key.to_string())),
            |pattern| Regex::new(pattern).map(Self::Pattern),
        )
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(name) => f.write_str(name),
            Self::Pattern(re) => write!(f, "{REGEX_PREFIX}{}", re.as_str()),
        }
    }
}

/// Ordered `file_overrides` entries.
#[derive(Debug, Clone, Default)]
pub struct FileOverrides(Vec<(FileKey, FileOverride)>);

impl FileOverrides {
    /// Build from already-compiled entries, keeping their order.
    #[must_use]
    pub const fn new(entries: Vec<(FileKey, FileOverride)>) -> Self {
        Self(entries)
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &(FileKey, FileOverride)> {
        self.0.iter()
    }

    /// Mutable entries in declaration order.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut (FileKey, FileOverride)> {
        self.0.iter_mut()
    }

    /// Find the override for `rel`, a path relative to the package root.
    ///
    /// A literal equal to the whole relative path wins, then a literal
    /// equal to the base name, then the first pattern (in declaration
    /// order) matching the relative path.
    #[must_use]
    pub fn lookup(&self, rel: &Path) -> Option<&FileOverride> {
        self.find_literal(|name| Path::new(name) == rel)
            .or_else(|| self.find_literal(|name| rel.file_name() == Some(OsStr::new(name))))
            .or_else(|| {
                let rel = rel.to_string_lossy();
                self.entries().find_map(|(key, value)| match key {
                    FileKey::Pattern(re) if re.is_match(&rel) => Some(value),
                    FileKey::Pattern(_) | FileKey::Literal(_) => None,
                })
            })
    }

    fn find_literal(&self, pred: impl Fn(&str) -> bool) -> Option<&FileOverride> {
        self.entries().find_map(|(key, value)| match key {
            FileKey::Literal(name) if pred(name) => Some(value),
            FileKey::Literal(_) | FileKey::Pattern(_) => None,
        })
    }
}

impl<'de> Deserialize<'de> for FileOverrides {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OverridesVisitor;

        impl<'de> Visitor<'de> for OverridesVisitor {
            type Value = FileOverrides;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of file names or regex: patterns to overrides")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FileOverrides::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, FileOverride>()? {
                    let parsed = key.parse::<FileKey>().map_err(|e| {
                        de::Error::custom(format!("invalid file override key {key:?}: {e}"))
                    })?;
                    entries.push((parsed, value));
                }
                Ok(FileOverrides(entries))
            }
        }

        deserializer.deserialize_map(OverridesVisitor)
    }
}

/// Deserialize an optional path, mapping `""` and `null` to `None`.
fn non_empty_path<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PathBuf>, D::Error> {
    Ok(non_empty_string(deserializer)?.map(PathBuf::from))
}

/// Deserialize an optional string, mapping `""` and `null` to `None`.
fn non_empty_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
