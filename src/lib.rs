//! Dotfile linker.
//!
//! dloom mirrors "packages" (directory trees of dotfiles) into a target
//! directory by creating per-file symlinks, and removes them again without
//! touching anything it did not create. Global, per-package and per-file
//! settings are merged from a YAML config, and environment conditions
//! (OS, distro, executables and their versions, user) decide which
//! packages and files apply on the current machine.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: load the YAML config and resolve effective settings per entry
//! - **[`conditions`]**: evaluate condition sets against the detected [`platform`]
//! - **[`resources`]**: symlink state checks and filesystem helpers
//! - **[`engine`]**: the link and unlink walks
//! - **[`commands`]**: top-level subcommand orchestration (`link`, `unlink`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod conditions;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod prompt;
pub mod resources;
