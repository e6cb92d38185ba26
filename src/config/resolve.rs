//! Global, package and file settings merged for one package entry.
use std::path::{Path, PathBuf};

use super::Settings;
use super::conditions::ConditionSet;

/// Settings in force for one `(package, relative path)` pair.
///
/// Borrowed from [`Settings`]; computed on demand and thrown away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSettings<'a> {
    /// Directory the entry is linked into.
    pub target_dir: &'a Path,
    /// Path of the link relative to `target_dir`.
    pub target_name: PathBuf,
    /// Backup root; `None` disables backups for this entry.
    pub backup_dir: Option<&'a Path>,
    /// Replace conflicts without asking.
    pub force: bool,
    /// Report actions at info level.
    pub verbose: bool,
    /// Only log intended mutations.
    pub dry_run: bool,
    /// Predicates gating this entry, if any.
    pub conditions: Option<&'a ConditionSet>,
}

impl EffectiveSettings<'_> {
    /// Full path of the link.
    #[must_use]
    pub fn target_path(&self) -> PathBuf {
        self.target_dir.join(&self.target_name)
    }

    /// Where the current occupant of `rel` is copied before replacement,
    /// or `None` when backups are disabled.
    #[must_use]
    pub fn backup_path(&self, rel: &Path) -> Option<PathBuf> {
        self.backup_dir.map(|dir| dir.join(rel))
    }
}

impl Settings {
    /// Settings for `package` as a whole, before any file override.
    ///
    /// Used to gate the package and to decide package-wide dry-run
    /// behaviour; `target_name` is empty.
    #[must_use]
    pub fn package_settings(&self, package: &str) -> EffectiveSettings<'_> {
        let mut eff = EffectiveSettings {
            target_dir: &self.target_dir,
            target_name: PathBuf::new(),
            backup_dir: self.backup_dir.as_deref(),
            force: self.force,
            verbose: self.verbose,
            dry_run: self.dry_run,
            conditions: None,
        };

        if let Some(pkg) = self.packages.get(package) {
            if let Some(dir) = &pkg.target_dir {
                eff.target_dir = dir.as_path();
            }
            if let Some(dir) = &pkg.backup_dir {
                eff.backup_dir = Some(dir.as_path());
            }
            eff.force = pkg.force.unwrap_or(eff.force);
            eff.verbose = pkg.verbose.unwrap_or(eff.verbose);
            eff.dry_run |= pkg.dry_run;
            eff.conditions = pkg.conditions.as_ref();
        }
        eff
    }

    /// Settings for the entry at `rel` (relative to the package root).
    ///
    /// Precedence is global, then package, then the matching file
    /// override. `dry_run` only accumulates. A file override's
    /// `conditions` replace the package's outright.
    #[must_use]
    pub fn resolve(&self, package: &str, rel: &Path) -> EffectiveSettings<'_> {
        let mut eff = self.package_settings(package);
        eff.target_name = rel.to_path_buf();

        let Some(file) = self
            .packages
            .get(package)
            .and_then(|pkg| pkg.files.lookup(rel))
        else {
            return eff;
        };

        if let Some(dir) = &file.target_dir {
            eff.target_dir = dir.as_path();
        }
        if let Some(name) = &file.target_name {
            eff.target_name = rel.parent().unwrap_or_else(|| Path::new("")).join(name);
        }
        if let Some(dir) = &file.backup_dir {
            eff.backup_dir = Some(dir.as_path());
        }
        eff.force = file.force.unwrap_or(eff.force);
        eff.verbose = file.verbose.unwrap_or(eff.verbose);
        eff.dry_run |= file.dry_run;
        if let Some(conditions) = &file.conditions {
            eff.conditions = Some(conditions);
        }
        eff
    }
}
