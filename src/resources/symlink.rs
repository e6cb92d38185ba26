//! Symlink resource: state check for one source/target pair.
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::helpers::fs::{create_symlink, paths_equal};
use crate::error::EngineError;

/// What currently occupies a target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occupant {
    /// A regular file (or other non-directory, non-symlink entry).
    File,
    /// A real directory.
    Directory,
    /// A symlink pointing somewhere other than the source.
    Symlink(PathBuf),
}

/// State of a target relative to its desired symlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Nothing exists at the target.
    Missing,
    /// The target is a symlink to the source.
    Correct,
    /// Something else is in the way.
    Conflict(Occupant),
}

/// A symlink from `target` to `source`.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The source file (what the symlink points to).
    pub source: PathBuf,
    /// The target path (where the symlink lives).
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// Human-readable `target -> source` description.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    /// Inspect the target without following it.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be inspected for any reason
    /// other than not existing, or is a symlink that cannot be read.
    pub fn current_state(&self) -> Result<LinkState, EngineError> {
        let meta = match self.target.symlink_metadata() {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LinkState::Missing),
            Err(e) => return Err(EngineError::io("inspect", &self.target)(e)),
        };

        if meta.file_type().is_symlink() {
            let existing = fs::read_link(&self.target)
                .map_err(EngineError::io("read link", &self.target))?;
            return Ok(if paths_equal(&existing, &self.source) {
                LinkState::Correct
            } else {
                LinkState::Conflict(Occupant::Symlink(existing))
            });
        }

        Ok(LinkState::Conflict(if meta.is_dir() {
            Occupant::Directory
        } else {
            Occupant::File
        }))
    }

    /// Create the symlink. The target must not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be created.
    pub fn create(&self) -> Result<(), EngineError> {
        create_symlink(&self.source, &self.target)
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, SymlinkResource) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        fs::write(&source, "content").unwrap();
        let target = dir.path().join("target");
        let resource = SymlinkResource::new(source, target);
        (dir, resource)
    }

    #[test]
    fn missing_when_target_absent() {
        let (_dir, r) = setup();
        assert_eq!(r.current_state().unwrap(), LinkState::Missing);
    }

    #[test]
    fn target_below_a_regular_file_is_an_error() {
        let (dir, _) = setup();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let r = SymlinkResource::new(dir.path().join("source"), blocker.join("target"));
        let err = r.current_state().unwrap_err();
        assert!(matches!(err, EngineError::Io { op: "inspect", .. }), "{err}");
    }

    #[test]
    fn correct_after_create() {
        let (_dir, r) = setup();
        r.create().unwrap();
        assert_eq!(r.current_state().unwrap(), LinkState::Correct);
    }

    #[test]
    fn conflict_for_regular_file() {
        let (_dir, r) = setup();
        fs::write(&r.target, "other").unwrap();
        assert_eq!(r.current_state().unwrap(), LinkState::Conflict(Occupant::File));
    }

    #[test]
    fn conflict_for_directory() {
        let (_dir, r) = setup();
        fs::create_dir(&r.target).unwrap();
        assert_eq!(
            r.current_state().unwrap(),
            LinkState::Conflict(Occupant::Directory)
        );
    }

    #[test]
    fn conflict_for_foreign_symlink() {
        let (_dir, r) = setup();
        std::os::unix::fs::symlink("/elsewhere", &r.target).unwrap();
        assert_eq!(
            r.current_state().unwrap(),
            LinkState::Conflict(Occupant::Symlink(PathBuf::from("/elsewhere")))
        );
    }

    #[test]
    fn broken_symlink_to_source_is_still_correct() {
        let (_dir, r) = setup();
        r.create().unwrap();
        fs::remove_file(&r.source).unwrap();
        assert_eq!(r.current_state().unwrap(), LinkState::Correct);
    }

    #[test]
    fn description_shows_direction() {
        let r = SymlinkResource::new(PathBuf::from("/src/a"), PathBuf::from("/dst/a"));
        assert_eq!(r.description(), "/dst/a -> /src/a");
    }
}
