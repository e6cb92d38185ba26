//! Subcommand implementations and the setup they share.
pub mod link;
pub mod unlink;
pub mod version;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::conditions::Matcher;
use crate::config::{self, Settings};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::platform::Platform;
use crate::prompt::StdinPrompt;

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates configuration loading, the CLI overlay and platform
/// detection so that `link` and `unlink` do not repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Finalised settings.
    pub settings: Settings,
    /// Detected platform.
    pub platform: Platform,
    /// Executor used for executable and version probes.
    pub executor: SystemExecutor,
}

impl CommandSetup {
    /// Load and finalise the settings, then detect the platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the home or working directory cannot be
    /// determined, or the config file cannot be read or parsed.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let home = config::home_dir()?;
        let cwd = std::env::current_dir().context("cannot determine working directory")?;

        log.stage("Loading configuration");
        let mut settings = Settings::load(global.config.as_deref(), &cwd, &home, log)?;
        settings.apply_overlay(&global.overlay());
        settings.finalize(&home)?;

        log.debug(&format!("source: {}", settings.source_dir.display()));
        log.debug(&format!("target: {}", settings.target_dir.display()));
        match &settings.backup_dir {
            Some(dir) => log.debug(&format!("backups: {}", dir.display())),
            None => log.debug("backups: disabled"),
        }
        log.debug(&format!("{} package overrides", settings.packages.len()));

        let platform = Platform::detect();
        log.debug(&format!(
            "platform: {} {} (user {})",
            platform.os,
            platform.distro.as_deref().unwrap_or("-"),
            platform.user.as_deref().unwrap_or("-")
        ));

        if settings.dry_run {
            log.info("dry run: no changes will be made");
        }

        Ok(Self {
            settings,
            platform,
            executor: SystemExecutor,
        })
    }
}

/// Set up, run `op` over the selected packages, print the summary, and
/// turn the outcome into the command result.
///
/// # Errors
///
/// Returns an error if setup fails, no packages were given, or any
/// package failed.
pub fn run_packages<R>(
    global: &GlobalOpts,
    positional: &[String],
    log: &Logger,
    op: impl FnOnce(&Engine<'_>, &[String], bool) -> Result<Vec<R>, EngineError>,
) -> Result<()> {
    let packages = global.packages_or(positional);
    if packages.is_empty() {
        return Err(EngineError::NoPackages.into());
    }

    let setup = CommandSetup::init(global, log)?;
    let matcher = Matcher::new(&setup.platform, &setup.executor, log);
    let engine = Engine::new(&setup.settings, &matcher, &StdinPrompt, log);

    let outcome = op(&engine, &packages, global.keep_going);
    log.print_summary();

    match outcome {
        Ok(_) => Ok(()),
        Err(_) if global.keep_going => {
            anyhow::bail!("{} package(s) failed", log.failure_count())
        }
        Err(e) => Err(e.into()),
    }
}
