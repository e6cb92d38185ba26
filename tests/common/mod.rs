// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed dotfiles repository and home
// directory plus a fluent builder, so each integration test can set up an
// isolated environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dloom::conditions::Matcher;
use dloom::config::Settings;
use dloom::engine::{Engine, LinkReport, UnlinkReport};
use dloom::error::EngineError;
use dloom::exec::SystemExecutor;
use dloom::logging::MemoryLog;
use dloom::platform::Platform;
use dloom::prompt::Prompt;

/// A [`Prompt`] that replays canned answers and records every question.
///
/// Running out of answers behaves like end of input.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().expect("questions lock").clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, message: &str) -> io::Result<bool> {
        self.questions
            .lock()
            .expect("questions lock")
            .push(message.to_string());
        self.answers
            .lock()
            .expect("answers lock")
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no answer"))
    }
}

/// An isolated dotfiles repository and home directory backed by a
/// [`tempfile::TempDir`].
///
/// Layout: `<tmp>/dotfiles/<package>/...` for sources and `<tmp>/home` as
/// the link target.
pub struct IntegrationTestContext {
    /// Temporary directory holding both trees.
    pub root: tempfile::TempDir,
    /// Settings in effect for engine runs.
    pub settings: Settings,
    /// Platform the conditions are evaluated against.
    pub platform: Platform,
    /// Captured log output of the last run.
    pub log: MemoryLog,
}

impl IntegrationTestContext {
    /// Create a context with default settings.
    pub fn new() -> Self {
        TestContextBuilder::new().build()
    }

    pub fn dotfiles(&self) -> PathBuf {
        self.root.path().join("dotfiles")
    }

    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    pub fn backups(&self) -> PathBuf {
        self.home().join(".dloom/backups")
    }

    /// Write a file into `package` and return its absolute path.
    pub fn source_file(&self, package: &str, rel: &str, content: &str) -> PathBuf {
        write_file(&self.dotfiles().join(package).join(rel), content)
    }

    /// Write a file into the home directory and return its absolute path.
    pub fn home_file(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.home().join(rel), content)
    }

    /// Link `packages` with fail-fast semantics.
    pub fn link(
        &self,
        packages: &[&str],
        prompt: &dyn Prompt,
    ) -> Result<Vec<LinkReport>, EngineError> {
        let names = to_names(packages);
        self.with_engine(prompt, |engine| engine.link_packages(&names, false))
    }

    /// Unlink `packages` with fail-fast semantics.
    pub fn unlink(&self, packages: &[&str]) -> Result<Vec<UnlinkReport>, EngineError> {
        let names = to_names(packages);
        let prompt = ScriptedPrompt::default();
        self.with_engine(&prompt, |engine| engine.unlink_packages(&names, false))
    }

    fn with_engine<T>(&self, prompt: &dyn Prompt, f: impl FnOnce(&Engine<'_>) -> T) -> T {
        let executor = SystemExecutor;
        let matcher = Matcher::new(&self.platform, &executor, &self.log);
        let engine = Engine::new(&self.settings, &matcher, prompt, &self.log);
        f(&engine)
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    root: tempfile::TempDir,
    yaml: String,
    platform: Platform,
}

impl TestContextBuilder {
    /// Begin building a context with empty `dotfiles/` and `home/` trees.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("dotfiles")).expect("create dotfiles dir");
        std::fs::create_dir_all(root.path().join("home")).expect("create home dir");
        Self {
            root,
            yaml: String::new(),
            platform: Platform::new("linux", Some("arch"), Some("tester")),
        }
    }

    /// Use `yaml` as the config file. `{root}` is replaced by the temp
    /// directory path.
    pub fn with_config(mut self, yaml: &str) -> Self {
        self.yaml = yaml.replace("{root}", &self.root.path().display().to_string());
        self
    }

    /// Evaluate conditions against `platform` instead of the default
    /// `linux`/`arch`/`tester`.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Parse the config and finalise the settings against the temp home.
    pub fn build(self) -> IntegrationTestContext {
        let home = self.root.path().join("home");
        let config = self.root.path().join("config.yaml");
        let mut settings = Settings::from_yaml(&self.yaml, &config, &home).expect("parse config");
        if !self.yaml.contains("source_dir") {
            settings.source_dir = self.root.path().join("dotfiles");
        }
        settings.finalize(&home).expect("finalize settings");
        IntegrationTestContext {
            root: self.root,
            settings,
            platform: self.platform,
            log: MemoryLog::new(),
        }
    }
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
    path.to_path_buf()
}

fn to_names(packages: &[&str]) -> Vec<String> {
    packages.iter().map(ToString::to_string).collect()
}

/// Snapshot of every entry under `dir` (relative path plus kind), used to
/// prove a run made no changes.
pub fn tree_snapshot(dir: &Path) -> Vec<String> {
    walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap_or(e.path()).display().to_string();
            let kind = if e.path_is_symlink() {
                format!("-> {}", std::fs::read_link(e.path()).map(|p| p.display().to_string()).unwrap_or_default())
            } else if e.file_type().is_dir() {
                "dir".to_string()
            } else {
                std::fs::read_to_string(e.path()).unwrap_or_default()
            };
            format!("{rel} {kind}")
        })
        .collect()
}
