//! Filesystem reconciliation: the link and unlink walks.
//!
//! An [`Engine`] borrows the finalised [`Settings`], a condition
//! [`Matcher`], a [`Prompt`] and a [`Log`]. Each package is walked in
//! lexical order; any I/O failure aborts that package's walk, leaving
//! earlier mutations in place.
mod link;
mod unlink;

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::conditions::Matcher;
use crate::config::Settings;
use crate::error::EngineError;
use crate::logging::{Log, PackageStatus};
use crate::prompt::Prompt;

pub use link::LinkReport;
pub use unlink::UnlinkReport;

/// Common view of a per-package report for the summary.
pub trait PackageReport: fmt::Display {
    /// Summary status for this package.
    fn status(&self) -> PackageStatus;
}

/// Drives link and unlink walks for one invocation.
pub struct Engine<'a> {
    settings: &'a Settings,
    matcher: &'a Matcher<'a>,
    prompt: &'a dyn Prompt,
    log: &'a dyn Log,
}

impl fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("settings", self.settings)
            .field("matcher", self.matcher)
            .finish_non_exhaustive()
    }
}

/// One walked entry of a package tree.
struct Entry {
    /// Absolute source path.
    source: PathBuf,
    /// Path relative to the package root.
    rel: PathBuf,
    /// Whether the source entry is a real directory.
    is_dir: bool,
}

impl<'a> Engine<'a> {
    /// Create an engine over finalised settings.
    #[must_use]
    pub const fn new(
        settings: &'a Settings,
        matcher: &'a Matcher<'a>,
        prompt: &'a dyn Prompt,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            settings,
            matcher,
            prompt,
            log,
        }
    }

    /// Link every package in order.
    ///
    /// Without `keep_going` the first failure is returned immediately.
    /// With it, failures are logged and recorded and the first one is
    /// returned after all packages have been attempted.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoPackages`] for an empty list, or an
    /// [`EngineError::Package`] wrapping the failure.
    pub fn link_packages(
        &self,
        packages: &[String],
        keep_going: bool,
    ) -> Result<Vec<LinkReport>, EngineError> {
        self.run_batch("link", "Linking", packages, keep_going, |p| {
            self.link_package(p)
        })
    }

    /// Unlink every package in order. Failure handling matches
    /// [`Engine::link_packages`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoPackages`] for an empty list, or an
    /// [`EngineError::Package`] wrapping the failure.
    pub fn unlink_packages(
        &self,
        packages: &[String],
        keep_going: bool,
    ) -> Result<Vec<UnlinkReport>, EngineError> {
        self.run_batch("unlink", "Unlinking", packages, keep_going, |p| {
            self.unlink_package(p)
        })
    }

    fn run_batch<R: PackageReport>(
        &self,
        action: &'static str,
        title: &str,
        packages: &[String],
        keep_going: bool,
        op: impl Fn(&str) -> Result<R, EngineError>,
    ) -> Result<Vec<R>, EngineError> {
        if packages.is_empty() {
            return Err(EngineError::NoPackages);
        }

        let mut reports = Vec::with_capacity(packages.len());
        let mut first_error = None;

        for package in packages {
            self.log.stage(&format!("{title} {package}"));
            match op(package.as_str()) {
                Ok(report) => {
                    let summary = report.to_string();
                    self.log.record_package(package, report.status(), Some(&summary));
                    self.log.detail(self.settings.verbose, &format!("{package}: {summary}"));
                    reports.push(report);
                }
                Err(source) => {
                    let err = EngineError::Package {
                        action,
                        package: package.clone(),
                        source: Box::new(source),
                    };
                    self.log
                        .record_package(package, PackageStatus::Failed, Some(&err.to_string()));
                    if !keep_going {
                        return Err(err);
                    }
                    self.log.error(&err.to_string());
                    first_error.get_or_insert(err);
                }
            }
        }

        first_error.map_or(Ok(reports), Err)
    }

    /// Resolve and check the package root.
    fn package_root(&self, package: &str) -> Result<PathBuf, EngineError> {
        let configured = self.settings.source_path(package);
        let root = std::path::absolute(&configured)
            .map_err(EngineError::io("resolve", &configured))?;
        if !root.is_dir() {
            return Err(EngineError::MissingPackage {
                package: package.to_string(),
                path: root,
            });
        }
        Ok(root)
    }

    /// Walk `root` in lexical order without following symlinks, calling
    /// `visit` for every entry below the root.
    fn walk(
        root: &Path,
        mut visit: impl FnMut(Entry) -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();
        for item in walker {
            let item = item.map_err(|source| EngineError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            let Ok(rel) = item.path().strip_prefix(root) else {
                continue;
            };
            let entry = Entry {
                rel: rel.to_path_buf(),
                is_dir: item.file_type().is_dir(),
                source: item.into_path(),
            };
            visit(entry)?;
        }
        Ok(())
    }
}
