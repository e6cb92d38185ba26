//! Unlink walk: remove owned symlinks, restore backups, prune empty
//! directories.
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Engine, Entry, PackageReport};
use crate::config::EffectiveSettings;
use crate::error::EngineError;
use crate::logging::PackageStatus;
use crate::resources::helpers::fs::{
    copy_entry, ensure_parent_dir, entry_exists, is_empty_dir, remove_symlink, remove_tree,
};
use crate::resources::{LinkState, Occupant, SymlinkResource};

/// What an unlink walk did (or would have done) for one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlinkReport {
    /// Owned symlinks removed.
    pub removed: usize,
    /// Backups copied back into place.
    pub restored: usize,
    /// Targets that were not ours to remove.
    pub left_alone: usize,
    /// Empty target directories removed.
    pub directories_removed: usize,
    /// Entries whose conditions did not match.
    pub skipped_by_conditions: usize,
    /// The package itself was gated out by its conditions.
    pub package_skipped: bool,
    /// The package ran in dry-run mode.
    pub dry_run: bool,
}

impl fmt::Display for UnlinkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package_skipped {
            return f.write_str("conditions not met");
        }
        write!(f, "{} removed", self.removed)?;
        if self.restored > 0 {
            write!(f, ", {} restored", self.restored)?;
        }
        if self.left_alone > 0 {
            write!(f, ", {} left alone", self.left_alone)?;
        }
        if self.directories_removed > 0 {
            write!(f, ", {} directories removed", self.directories_removed)?;
        }
        if self.skipped_by_conditions > 0 {
            write!(f, ", {} skipped", self.skipped_by_conditions)?;
        }
        Ok(())
    }
}

impl PackageReport for UnlinkReport {
    fn status(&self) -> PackageStatus {
        if self.package_skipped {
            PackageStatus::NotApplicable
        } else if self.dry_run {
            PackageStatus::DryRun
        } else {
            PackageStatus::Ok
        }
    }
}

/// Per-directory flags kept for the cleanup pass.
#[derive(Debug, Clone, Copy)]
struct DirFlags {
    dry_run: bool,
    verbose: bool,
}

impl Engine<'_> {
    /// Unlink one package.
    ///
    /// Only symlinks that point at the package's own source are removed.
    /// Afterwards any backup for the entry is copied back over the target
    /// and deleted. Target directories mirrored from the package are then
    /// pruned deepest-first if they ended up empty.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingPackage`] if the package directory
    /// does not exist, or the first filesystem failure. Directory cleanup
    /// failures are only warnings.
    pub fn unlink_package(&self, package: &str) -> Result<UnlinkReport, EngineError> {
        let pkg = self.settings.package_settings(package);
        if !self.matcher.matches(pkg.conditions) {
            self.log.detail(
                pkg.verbose,
                &format!("skipping package {package}: conditions not met"),
            );
            return Ok(UnlinkReport {
                package_skipped: true,
                ..UnlinkReport::default()
            });
        }

        let root = self.package_root(package)?;
        let mut report = UnlinkReport {
            dry_run: pkg.dry_run,
            ..UnlinkReport::default()
        };
        let mut dirs = BTreeMap::new();

        Self::walk(&root, |entry| {
            let eff = self.settings.resolve(package, &entry.rel);
            if !self.matcher.matches(eff.conditions) {
                self.log.detail(
                    eff.verbose,
                    &format!("skipping {}: conditions not met", entry.rel.display()),
                );
                report.skipped_by_conditions += 1;
                return Ok(());
            }
            if entry.is_dir {
                dirs.insert(
                    eff.target_path(),
                    DirFlags {
                        dry_run: eff.dry_run,
                        verbose: eff.verbose,
                    },
                );
                return Ok(());
            }
            self.unlink_file(&entry, &eff, &mut report)
        })?;

        self.prune_dirs(dirs, &mut report);
        Ok(report)
    }

    fn unlink_file(
        &self,
        entry: &Entry,
        eff: &EffectiveSettings<'_>,
        report: &mut UnlinkReport,
    ) -> Result<(), EngineError> {
        let link = SymlinkResource::new(entry.source.clone(), eff.target_path());

        match link.current_state()? {
            LinkState::Missing => {
                self.log
                    .detail(eff.verbose, &format!("nothing at {}", link.target.display()));
            }
            LinkState::Correct => {
                if eff.dry_run {
                    self.log
                        .dry_run(&format!("would remove symlink {}", link.description()));
                } else {
                    remove_symlink(&link.target)?;
                    self.log
                        .detail(eff.verbose, &format!("removed {}", link.description()));
                }
                report.removed += 1;
            }
            LinkState::Conflict(Occupant::Symlink(dest)) => {
                self.log.detail(
                    eff.verbose,
                    &format!(
                        "leaving {}: points to {}",
                        link.target.display(),
                        dest.display()
                    ),
                );
                report.left_alone += 1;
            }
            LinkState::Conflict(Occupant::File | Occupant::Directory) => {
                self.log.detail(
                    eff.verbose,
                    &format!("leaving {}: not a symlink", link.target.display()),
                );
                report.left_alone += 1;
            }
        }

        self.restore_backup(&entry.rel, &link.target, eff, report)
    }

    /// Copy the backup for `rel` over `target` and delete the backup.
    ///
    /// Runs whatever the removal step decided; an existing non-directory
    /// occupant is replaced.
    fn restore_backup(
        &self,
        rel: &Path,
        target: &Path,
        eff: &EffectiveSettings<'_>,
        report: &mut UnlinkReport,
    ) -> Result<(), EngineError> {
        let Some(backup) = eff.backup_path(rel).filter(|b| entry_exists(b)) else {
            return Ok(());
        };

        if eff.dry_run {
            self.log.dry_run(&format!(
                "would restore {} from {}",
                target.display(),
                backup.display()
            ));
            report.restored += 1;
            return Ok(());
        }

        ensure_parent_dir(target)?;
        copy_entry(&backup, target)?;
        self.log.info(&format!(
            "restored {} from {}",
            target.display(),
            backup.display()
        ));
        report.restored += 1;

        if let Err(e) = remove_tree(&backup) {
            self.log.warn(&format!("could not remove backup: {e}"));
        }
        Ok(())
    }

    /// Remove now-empty target directories, deepest first.
    fn prune_dirs(&self, dirs: BTreeMap<PathBuf, DirFlags>, report: &mut UnlinkReport) {
        let mut dirs: Vec<_> = dirs.into_iter().collect();
        dirs.sort_by_key(|(path, _)| std::cmp::Reverse(path.components().count()));

        for (dir, flags) in dirs {
            if !is_empty_dir(&dir) {
                continue;
            }
            if flags.dry_run {
                self.log
                    .dry_run(&format!("would remove empty directory {}", dir.display()));
                continue;
            }
            match fs::remove_dir(&dir) {
                Ok(()) => {
                    self.log.detail(
                        flags.verbose,
                        &format!("removed empty directory {}", dir.display()),
                    );
                    report.directories_removed += 1;
                }
                Err(e) => self.log.warn(&format!(
                    "could not remove directory {}: {e}",
                    dir.display()
                )),
            }
        }
    }
}
