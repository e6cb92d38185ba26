#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for config loading and per-entry settings
//! resolution.

mod common;

use std::path::{Path, PathBuf};

use common::*;
use dloom::config::{CliOverlay, Settings};
use dloom::error::ConfigError;
use dloom::logging::{Level, MemoryLog};

const LAYERED: &str = "\
source_dir: ~/dots
target_dir: ~/
verbose: true
link_overrides:
  vim:
    target_dir: ~/vim-home
    force: true
    file_overrides:
      colors.vim:
        target_dir: ~/colors
        target_name: theme.vim
        verbose: false
      \"regex:.*\\\\.lua$\":
        dry_run: true
";

fn layered() -> Settings {
    let home = Path::new("/home/u");
    let mut settings =
        Settings::from_yaml(LAYERED, Path::new("config.yaml"), home).unwrap();
    settings.finalize(home).unwrap();
    settings
}

#[test]
fn tilde_paths_expand_against_home() {
    let s = layered();
    assert_eq!(s.source_dir, PathBuf::from("/home/u/dots"));
    assert_eq!(s.target_dir, PathBuf::from("/home/u"));
    assert_eq!(s.source_path("vim"), PathBuf::from("/home/u/dots/vim"));
}

#[test]
fn package_level_overrides_global() {
    let s = layered();
    let eff = s.resolve("vim", Path::new(".vimrc"));
    assert_eq!(eff.target_path(), PathBuf::from("/home/u/vim-home/.vimrc"));
    assert!(eff.force);
    assert!(eff.verbose);
    assert!(!eff.dry_run);
}

#[test]
fn file_level_overrides_package() {
    let s = layered();
    let eff = s.resolve("vim", Path::new("colors/colors.vim"));
    assert_eq!(eff.target_path(), PathBuf::from("/home/u/colors/colors/theme.vim"));
    assert!(eff.force);
    assert!(!eff.verbose);
}

#[test]
fn regex_override_only_turns_dry_run_on() {
    let s = layered();
    assert!(s.resolve("vim", Path::new("lua/init.lua")).dry_run);
    assert!(!s.resolve("vim", Path::new("init.vim")).dry_run);
    assert!(!s.package_settings("vim").dry_run);
}

#[test]
fn other_packages_see_only_globals() {
    let s = layered();
    let eff = s.resolve("zsh", Path::new(".zshrc"));
    assert_eq!(eff.target_path(), PathBuf::from("/home/u/.zshrc"));
    assert!(!eff.force);
    assert_eq!(
        eff.backup_path(Path::new(".zshrc")),
        Some(PathBuf::from("/home/u/.dloom/backups/.zshrc"))
    );
}

#[test]
fn cli_overlay_only_enables_flags() {
    let home = Path::new("/home/u");
    let mut s = Settings::from_yaml("force: true\n", Path::new("c.yaml"), home).unwrap();
    s.apply_overlay(&CliOverlay {
        target_dir: Some(PathBuf::from("/srv/t")),
        dry_run: true,
        ..CliOverlay::default()
    });
    s.finalize(home).unwrap();
    assert!(s.force);
    assert!(s.dry_run);
    assert_eq!(s.target_dir, PathBuf::from("/srv/t"));
}

#[test]
fn empty_backup_dir_disables_backups() {
    let s = Settings::from_yaml("backup_dir: \"\"\n", Path::new("c.yaml"), Path::new("/h")).unwrap();
    assert_eq!(s.backup_dir, None);
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = Settings::from_yaml("force: [", Path::new("c.yaml"), Path::new("/h")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn invalid_override_regex_is_a_parse_error() {
    let yaml = "link_overrides:\n  p:\n    file_overrides:\n      \"regex:(\":\n        force: true\n";
    let err = Settings::from_yaml(yaml, Path::new("c.yaml"), Path::new("/h")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn load_discovers_local_config_before_user_config() {
    let dir = tempfile::tempdir().unwrap();
    let cwd = dir.path().join("work");
    let home = dir.path().join("home");
    std::fs::create_dir_all(cwd.join("dloom")).unwrap();
    std::fs::create_dir_all(home.join(".config/dloom")).unwrap();
    std::fs::write(cwd.join("dloom/config.yaml"), "force: true\n").unwrap();
    std::fs::write(home.join(".config/dloom/config.yaml"), "verbose: true\n").unwrap();
    let log = MemoryLog::new();

    let s = Settings::load(None, &cwd, &home, &log).unwrap();

    assert!(s.force);
    assert!(!s.verbose);
}

#[test]
fn load_missing_explicit_file_warns_and_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let log = MemoryLog::new();
    let missing = dir.path().join("absent.yaml");

    let s = Settings::load(Some(&missing), dir.path(), dir.path(), &log).unwrap();

    assert!(!s.force);
    assert_eq!(s.target_dir, dir.path());
    assert!(log.contains(Level::Warn, "not found"));
}

#[test]
fn builder_config_reaches_engine_settings() {
    let ctx = TestContextBuilder::new().with_config("force: true\n").build();
    assert!(ctx.settings.force);
    assert_eq!(ctx.settings.target_dir, ctx.home());
}
