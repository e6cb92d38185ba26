//! Domain-specific error types for the dloom engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Configuration loading returns [`ConfigError`]; the link and unlink walks
//! return [`EngineError`]. Command handlers at the CLI boundary convert both
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError : fatal before any filesystem mutation
//! ├── Read : config file exists but cannot be read
//! ├── Parse : malformed YAML or invalid override pattern
//! ├── HomeUnavailable : no home directory to expand `~` against
//! └── Path : a configured path cannot be made absolute
//!
//! EngineError : aborts the current package walk
//! ├── MissingPackage : resolved source directory does not exist
//! ├── Io : any create/remove/copy/symlink/read-link failure
//! ├── Walk : the source tree could not be traversed
//! ├── Prompt : the confirmation answer could not be read
//! ├── Package : one of the above, tagged with its package
//! └── NoPackages : nothing to do
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while loading and preparing the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid YAML or does not match the schema.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying deserialization error.
        source: serde_yaml::Error,
    },

    /// Neither `HOME` nor `USERPROFILE` is set.
    #[error("cannot determine home directory: neither HOME nor USERPROFILE is set")]
    HomeUnavailable,

    /// A configured path could not be made absolute.
    #[error("cannot resolve path {}: {source}", path.display())]
    Path {
        /// The offending path, after `~` expansion.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that abort a link or unlink walk.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The resolved package source directory does not exist.
    #[error("package directory {} does not exist", path.display())]
    MissingPackage {
        /// Package name as given on the command line.
        package: String,
        /// Resolved source directory.
        path: PathBuf,
    },

    /// A filesystem operation failed.
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        /// Short verb phrase describing the failed operation.
        op: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The source tree could not be traversed.
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        /// Package root being walked.
        path: PathBuf,
        /// Underlying traversal error.
        source: walkdir::Error,
    },

    /// The confirmation answer could not be read from standard input.
    #[error("failed to read confirmation: {0}")]
    Prompt(#[source] std::io::Error),

    /// A package-level operation failed.
    #[error("failed to {action} package {package}: {source}")]
    Package {
        /// `"link"` or `"unlink"`.
        action: &'static str,
        /// Package name.
        package: String,
        /// The error that aborted the walk.
        source: Box<EngineError>,
    },

    /// The package list was empty.
    #[error("no packages specified")]
    NoPackages,
}

impl EngineError {
    /// Build an [`EngineError::Io`] for `op` applied to `path`.
    ///
    /// Intended for `map_err` chains:
    /// `std::fs::remove_file(&p).map_err(EngineError::io("remove", &p))?`.
    pub fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { op, path, source }
    }
}
