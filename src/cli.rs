//! Command-line surface: global flags and the `link`, `unlink` and `version` subcommands.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::CliOverlay;

/// Top-level CLI entry point for dloom.
#[derive(Parser, Debug)]
#[command(
    name = "dloom",
    about = "Link dotfile packages into place with symlinks",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Options accepted before or after the subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Config file to load instead of the discovered one
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Replace conflicting targets without asking
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long, short_alias = 'n', global = true)]
    pub dry_run: bool,

    /// Directory containing the packages
    #[arg(short, long, alias = "src", global = true, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Directory the links are created in
    #[arg(short, long, alias = "dest", global = true, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Package to process (repeatable, comma-separated); replaces the
    /// positional list
    #[arg(
        id = "package_list",
        short,
        long = "package",
        value_delimiter = ',',
        global = true,
        value_name = "NAME"
    )]
    pub packages: Vec<String>,

    /// Continue with the next package after a failure
    #[arg(long, global = true)]
    pub keep_going: bool,
}

impl GlobalOpts {
    /// Settings overlay built from the flags.
    #[must_use]
    pub fn overlay(&self) -> CliOverlay {
        CliOverlay {
            source_dir: self.source.clone(),
            target_dir: self.target.clone(),
            force: self.force,
            verbose: self.verbose,
            dry_run: self.dry_run,
        }
    }

    /// Packages to process: `--package` values if any, else `positional`.
    #[must_use]
    pub fn packages_or(&self, positional: &[String]) -> Vec<String> {
        if self.packages.is_empty() {
            positional.to_vec()
        } else {
            self.packages.clone()
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Link packages into the target directory
    Link(PackageArgs),
    /// Remove links created by `link` and restore backups
    Unlink(PackageArgs),
    /// Print version information
    Version,
}

/// Positional package names for `link` and `unlink`.
#[derive(Args, Debug, Clone, Default)]
pub struct PackageArgs {
    /// Packages to process
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn packages(cli: &Cli) -> Vec<String> {
        match &cli.command {
            Command::Link(args) | Command::Unlink(args) => cli.global.packages_or(&args.packages),
            Command::Version => vec![],
        }
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_link_positional_packages() {
        let cli = Cli::parse_from(["dloom", "link", "vim", "tmux"]);
        assert!(matches!(cli.command, Command::Link(_)));
        assert_eq!(packages(&cli), vec!["vim", "tmux"]);
    }

    #[test]
    fn package_flag_replaces_positional_list() {
        let cli =
            Cli::try_parse_from(["dloom", "link", "vim", "-p", "zsh,git", "--package", "tmux"])
                .unwrap();
        assert_eq!(packages(&cli), vec!["zsh", "git", "tmux"]);
    }

    #[test]
    fn package_flag_accepted_on_either_side_of_subcommand() {
        for argv in [
            vec!["dloom", "link", "-p", "vim", "-n"],
            vec!["dloom", "unlink", "--package", "vim", "-n"],
            vec!["dloom", "--package", "vim", "link", "-n"],
        ] {
            let cli = Cli::try_parse_from(&argv).unwrap_or_else(|e| panic!("{argv:?}: {e}"));
            assert_eq!(packages(&cli), vec!["vim"], "{argv:?}");
            assert!(cli.global.dry_run);
        }
    }

    #[test]
    fn parse_unlink() {
        let cli = Cli::parse_from(["dloom", "unlink", "vim"]);
        assert!(matches!(cli.command, Command::Unlink(_)));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["dloom", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn dry_run_long_short_and_alias() {
        for flag in ["--dry-run", "-d", "-n"] {
            let cli = Cli::parse_from(["dloom", flag, "link", "vim"]);
            assert!(cli.global.dry_run, "{flag} should enable dry run");
        }
    }

    #[test]
    fn directory_aliases() {
        let cli = Cli::parse_from(["dloom", "link", "--src", "/dots", "--dest", "/home/u", "vim"]);
        assert_eq!(cli.global.source, Some(PathBuf::from("/dots")));
        assert_eq!(cli.global.target, Some(PathBuf::from("/home/u")));

        let cli = Cli::parse_from(["dloom", "-s", "/a", "-t", "/b", "link"]);
        assert_eq!(cli.global.source, Some(PathBuf::from("/a")));
        assert_eq!(cli.global.target, Some(PathBuf::from("/b")));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["dloom", "unlink", "-f", "-v", "--keep-going", "-c", "x.yaml"]);
        assert!(cli.global.force);
        assert!(cli.global.verbose);
        assert!(cli.global.keep_going);
        assert_eq!(cli.global.config, Some(PathBuf::from("x.yaml")));
    }

    #[test]
    fn overlay_carries_flags() {
        let cli = Cli::parse_from(["dloom", "-f", "-n", "-t", "/t", "link"]);
        let overlay = cli.global.overlay();
        assert!(overlay.force);
        assert!(overlay.dry_run);
        assert!(!overlay.verbose);
        assert_eq!(overlay.target_dir, Some(PathBuf::from("/t")));
        assert_eq!(overlay.source_dir, None);
    }

    #[test]
    fn link_without_packages_parses_to_empty_list() {
        let cli = Cli::parse_from(["dloom", "link"]);
        assert!(packages(&cli).is_empty());
    }
}
