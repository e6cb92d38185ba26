//! Configuration loading: YAML file discovery, defaults, CLI overlay and
//! path finalisation.
pub mod conditions;
pub mod overrides;
pub mod resolve;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::logging::Log;

pub use conditions::ConditionSet;
pub use overrides::{FileKey, FileOverride, FileOverrides, PackageOverride};
pub use resolve::EffectiveSettings;

/// Config file location relative to the working directory.
const LOCAL_CONFIG: &str = "dloom/config.yaml";
/// Config file location relative to the home directory.
const USER_CONFIG: &str = ".config/dloom/config.yaml";
/// Default backup directory relative to the home directory.
const DEFAULT_BACKUP_DIR: &str = ".dloom/backups";

/// Global settings for one invocation.
///
/// Built once from the config file (or defaults), overlaid with CLI flags,
/// finalised, and then only read.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding one subdirectory per package.
    pub source_dir: PathBuf,
    /// Directory the package trees are mirrored into.
    pub target_dir: PathBuf,
    /// Where displaced files are copied; `None` disables backups.
    pub backup_dir: Option<PathBuf>,
    /// Replace conflicting targets without asking.
    pub force: bool,
    /// Report per-file actions at info level.
    pub verbose: bool,
    /// Log intended mutations instead of performing them.
    pub dry_run: bool,
    /// Package overrides keyed by package name.
    pub packages: BTreeMap<String, PackageOverride>,
}

/// Top-level YAML shape. Absent keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    source_dir: Option<String>,
    target_dir: Option<String>,
    backup_dir: Option<String>,
    force: bool,
    verbose: bool,
    dry_run: bool,
    #[serde(rename = "link_overrides")]
    packages: BTreeMap<String, PackageOverride>,
}

/// Command-line values layered over the loaded settings.
///
/// Flags can only switch a setting on; directories replace the
/// configured ones.
#[derive(Debug, Clone, Default)]
pub struct CliOverlay {
    /// `--source`.
    pub source_dir: Option<PathBuf>,
    /// `--target`.
    pub target_dir: Option<PathBuf>,
    /// `--force`.
    pub force: bool,
    /// `--verbose`.
    pub verbose: bool,
    /// `--dry-run`.
    pub dry_run: bool,
}

impl Settings {
    /// Built-in defaults: packages under the working directory, linked
    /// into `home`, with backups under `~/.dloom/backups`.
    #[must_use]
    pub fn defaults(home: &Path) -> Self {
        Self {
            source_dir: PathBuf::from("."),
            target_dir: home.to_path_buf(),
            backup_dir: Some(home.join(DEFAULT_BACKUP_DIR)),
            force: false,
            verbose: false,
            dry_run: false,
            packages: BTreeMap::new(),
        }
    }

    /// Load settings from `explicit`, or from the first config file found
    /// by [`discover`], falling back to [`Settings::defaults`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if an existing file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid.
    pub fn load(
        explicit: Option<&Path>,
        cwd: &Path,
        home: &Path,
        log: &dyn Log,
    ) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                if let Some(found) = discover(cwd, home) {
                    found
                } else {
                    log.debug("no config file found, using defaults");
                    return Ok(Self::defaults(home));
                }
            }
        };

        log.debug(&format!("loading config file: {}", path.display()));
        match fs::read_to_string(&path) {
            Ok(text) => Self::from_yaml(&text, &path, home),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log.warn(&format!(
                    "config file {} not found, using defaults",
                    path.display()
                ));
                Ok(Self::defaults(home))
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    /// Parse YAML `text` over the defaults. `path` is used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML or an invalid
    /// `regex:` override key.
    pub fn from_yaml(text: &str, path: &Path, home: &Path) -> Result<Self, ConfigError> {
        let mut settings = Self::defaults(home);
        if text.trim().is_empty() {
            return Ok(settings);
        }

        let raw: RawSettings = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(dir) = raw.source_dir.filter(|s| !s.is_empty()) {
            settings.source_dir = PathBuf::from(dir);
        }
        if let Some(dir) = raw.target_dir.filter(|s| !s.is_empty()) {
            settings.target_dir = PathBuf::from(dir);
        }
        // An explicit empty string switches backups off.
        if let Some(dir) = raw.backup_dir {
            settings.backup_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }
        settings.force = raw.force;
        settings.verbose = raw.verbose;
        settings.dry_run = raw.dry_run;
        settings.packages = raw.packages;
        Ok(settings)
    }

    /// Apply command-line values.
    pub fn apply_overlay(&mut self, overlay: &CliOverlay) {
        if let Some(dir) = &overlay.source_dir {
            self.source_dir.clone_from(dir);
        }
        if let Some(dir) = &overlay.target_dir {
            self.target_dir.clone_from(dir);
        }
        self.force |= overlay.force;
        self.verbose |= overlay.verbose;
        self.dry_run |= overlay.dry_run;
    }

    /// Expand `~` and make every configured directory absolute.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Path`] if a path cannot be made absolute.
    pub fn finalize(&mut self, home: &Path) -> Result<(), ConfigError> {
        self.source_dir = expand_path(&self.source_dir, home)?;
        self.target_dir = expand_path(&self.target_dir, home)?;
        expand_opt(&mut self.backup_dir, home)?;

        for pkg in self.packages.values_mut() {
            expand_opt(&mut pkg.source_dir, home)?;
            expand_opt(&mut pkg.target_dir, home)?;
            expand_opt(&mut pkg.backup_dir, home)?;
            for (_, file) in pkg.files.entries_mut() {
                expand_opt(&mut file.target_dir, home)?;
                expand_opt(&mut file.backup_dir, home)?;
            }
        }
        Ok(())
    }

    /// Directory holding `package`'s files.
    ///
    /// A package-level `source_dir` names the package directory itself.
    #[must_use]
    pub fn source_path(&self, package: &str) -> PathBuf {
        self.packages
            .get(package)
            .and_then(|p| p.source_dir.clone())
            .unwrap_or_else(|| self.source_dir.join(package))
    }
}

/// Find the first existing config file: `./dloom/config.yaml`, then
/// `~/.config/dloom/config.yaml`.
#[must_use]
pub fn discover(cwd: &Path, home: &Path) -> Option<PathBuf> {
    [cwd.join(LOCAL_CONFIG), home.join(USER_CONFIG)]
        .into_iter()
        .find(|p| p.is_file())
}

/// Resolve the home directory from `HOME` (or `USERPROFILE` on Windows).
///
/// # Errors
///
/// Returns [`ConfigError::HomeUnavailable`] if neither is set.
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::HomeUnavailable)
}

/// Replace a leading `~` component with `home`, then make the path
/// absolute against the working directory.
///
/// # Errors
///
/// Returns [`ConfigError::Path`] if the path cannot be made absolute.
pub fn expand_path(path: &Path, home: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    };
    std::path::absolute(&expanded).map_err(|source| ConfigError::Path {
        path: expanded,
        source,
    })
}

fn expand_opt(slot: &mut Option<PathBuf>, home: &Path) -> Result<(), ConfigError> {
    if let Some(path) = slot.as_deref() {
        *slot = Some(expand_path(path, home)?);
    }
    Ok(())
}
