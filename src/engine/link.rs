//! Link walk: mirror a package tree into the target tree as symlinks.
use std::fmt;
use std::path::Path;

use super::{Engine, Entry, PackageReport};
use crate::config::EffectiveSettings;
use crate::error::EngineError;
use crate::logging::PackageStatus;
use crate::resources::helpers::fs::{
    copy_entry, create_dir_all, ensure_parent_dir, remove_entry, remove_tree,
};
use crate::resources::{LinkState, SymlinkResource};

/// What a link walk did (or would have done) for one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Symlinks created.
    pub linked: usize,
    /// Targets that already pointed at their source.
    pub already_linked: usize,
    /// Occupants copied into the backup tree.
    pub backed_up: usize,
    /// Target directories created.
    pub directories: usize,
    /// Conflicts the user chose to keep.
    pub declined: usize,
    /// Entries whose conditions did not match.
    pub skipped_by_conditions: usize,
    /// The package itself was gated out by its conditions.
    pub package_skipped: bool,
    /// The package ran in dry-run mode.
    pub dry_run: bool,
}

impl fmt::Display for LinkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package_skipped {
            return f.write_str("conditions not met");
        }
        write!(f, "{} linked, {} already linked", self.linked, self.already_linked)?;
        if self.backed_up > 0 {
            write!(f, ", {} backed up", self.backed_up)?;
        }
        if self.declined > 0 {
            write!(f, ", {} declined", self.declined)?;
        }
        if self.skipped_by_conditions > 0 {
            write!(f, ", {} skipped", self.skipped_by_conditions)?;
        }
        Ok(())
    }
}

impl PackageReport for LinkReport {
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

impl Engine<'_> {
    /// Link one package.
    ///
    /// Directories are created in the target tree and files are linked
    /// individually. A conflicting occupant is replaced only after the
    /// user confirms (unless `force` or dry-run is set) and, when backups
    /// are enabled, after it has been copied into the backup tree.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingPackage`] if the package directory
    /// does not exist, or the first filesystem or prompt failure.
    pub fn link_package(&self, package: &str) -> Result<LinkReport, EngineError> {
        let pkg = self.settings.package_settings(package);
        if !self.matcher.matches(pkg.conditions) {
            self.log.detail(
                pkg.verbose,
                &format!("skipping package {package}: conditions not met"),
            );
            return Ok(LinkReport {
                package_skipped: true,
                ..LinkReport::default()
            });
        }

        let root = self.package_root(package)?;
        let mut report = LinkReport {
            dry_run: pkg.dry_run,
            ..LinkReport::default()
        };

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
                self.link_dir(&eff, &mut report)
            } else {
                self.link_file(&entry, &eff, &mut report)
            }
        })?;

        Ok(report)
    }

    fn link_dir(
        &self,
        eff: &EffectiveSettings<'_>,
        report: &mut LinkReport,
    ) -> Result<(), EngineError> {
        let target = eff.target_path();
        if target.is_dir() {
            return Ok(());
        }
        if eff.dry_run {
            self.log
                .dry_run(&format!("would create directory {}", target.display()));
        } else {
            create_dir_all(&target)?;
            self.log
                .detail(eff.verbose, &format!("created directory {}", target.display()));
        }
        report.directories += 1;
        Ok(())
    }

    fn link_file(
        &self,
        entry: &Entry,
        eff: &EffectiveSettings<'_>,
        report: &mut LinkReport,
    ) -> Result<(), EngineError> {
        let link = SymlinkResource::new(entry.source.clone(), eff.target_path());
        if !eff.dry_run {
            ensure_parent_dir(&link.target)?;
        }

        match link.current_state()? {
            LinkState::Missing => {}
            LinkState::Correct => {
                self.log
                    .detail(eff.verbose, &format!("already linked: {}", link.description()));
                report.already_linked += 1;
                return Ok(());
            }
            LinkState::Conflict(_) => {
                if !eff.force && !eff.dry_run && !self.confirm_replace(&link.target)? {
                    self.log
                        .info(&format!("skipping {}", link.target.display()));
                    report.declined += 1;
                    return Ok(());
                }
                self.replace_occupant(&entry.rel, &link.target, eff, report)?;
            }
        }

        if eff.dry_run {
            self.log.dry_run(&format!("would link {}", link.description()));
        } else {
            link.create()?;
            self.log
                .detail(eff.verbose, &format!("linked {}", link.description()));
        }
        report.linked += 1;
        Ok(())
    }

    fn confirm_replace(&self, target: &Path) -> Result<bool, EngineError> {
        self.prompt
            .confirm(&format!("Target already exists: {}. Replace?", target.display()))
            .map_err(EngineError::Prompt)
    }

    /// Back up (if enabled) and remove whatever sits at `target`.
    ///
    /// A real directory is removed recursively only once it has been
    /// backed up; otherwise only an empty one can go.
    fn replace_occupant(
        &self,
        rel: &Path,
        target: &Path,
        eff: &EffectiveSettings<'_>,
        report: &mut LinkReport,
    ) -> Result<(), EngineError> {
        let backup = eff.backup_path(rel);

        if let Some(backup) = &backup {
            if eff.dry_run {
                self.log.dry_run(&format!(
                    "would back up {} to {}",
                    target.display(),
                    backup.display()
                ));
            } else {
                ensure_parent_dir(backup)?;
                copy_entry(target, backup)?;
                self.log.info(&format!(
                    "backed up {} to {}",
                    target.display(),
                    backup.display()
                ));
            }
            report.backed_up += 1;
        }

        if eff.dry_run {
            self.log
                .dry_run(&format!("would remove existing target {}", target.display()));
        } else if backup.is_some() {
            remove_tree(target)?;
        } else {
            remove_entry(target)?;
        }
        Ok(())
    }
}
