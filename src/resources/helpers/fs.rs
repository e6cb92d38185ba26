//! File-system helpers shared by the link and unlink engines.
//!
//! All failures are reported as [`EngineError::Io`] carrying the failed
//! operation and path.
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// Permission bits for directories created under the target and backup
/// trees.
pub const DIR_MODE: u32 = 0o750;

/// Create `path` and any missing ancestors with [`DIR_MODE`].
///
/// # Errors
///
/// Returns an error if a directory cannot be created.
pub fn create_dir_all(path: &Path) -> Result<(), EngineError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt as _;
        builder.mode(DIR_MODE);
    }
    builder
        .create(path)
        .map_err(EngineError::io("create directory", path))
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), EngineError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Whether anything (including a broken symlink) exists at `path`.
#[must_use]
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Remove whatever sits at `path` without following symlinks.
///
/// Files and symlinks are unlinked; a real directory is only removed when
/// empty. Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the entry exists but cannot be removed.
pub fn remove_entry(path: &Path) -> Result<(), EngineError> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        fs::remove_dir(path).map_err(EngineError::io("remove directory", path))
    } else {
        remove_symlink(path)
    }
}

/// Remove a whole tree at `path` (used for directory backups).
///
/// # Errors
///
/// Returns an error if the entry exists but cannot be removed.
pub fn remove_tree(path: &Path) -> Result<(), EngineError> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(EngineError::io("remove directory", path))
    } else {
        remove_symlink(path)
    }
}

/// Copy the entry at `src` to `dst` without following a top-level symlink.
///
/// Regular files keep their permission bits, symlinks are recreated with
/// the same destination, and directories are copied recursively. A file
/// or symlink already at `dst` is replaced.
///
/// # Errors
///
/// Returns an error if `src` cannot be inspected or any part of the copy
/// fails.
pub fn copy_entry(src: &Path, dst: &Path) -> Result<(), EngineError> {
    let meta = src
        .symlink_metadata()
        .map_err(EngineError::io("inspect", src))?;

    if meta.is_dir() {
        return copy_dir_recursive(src, dst);
    }

    if let Ok(existing) = dst.symlink_metadata()
        && !existing.is_dir()
    {
        remove_symlink(dst)?;
    }

    if meta.file_type().is_symlink() {
        let dest = fs::read_link(src).map_err(EngineError::io("read link", src))?;
        create_symlink(&dest, dst)
    } else {
        fs::copy(src, dst)
            .map(|_| ())
            .map_err(EngineError::io("copy to", dst))
    }
}

/// Recursively copy a directory tree, preserving symlinks as symlinks.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), EngineError> {
    create_dir_all(dst)?;
    for entry in fs::read_dir(src).map_err(EngineError::io("read directory", src))? {
        let entry = entry.map_err(EngineError::io("read directory", src))?;
        copy_entry(&entry.path(), &dst.join(entry.file_name()))?;
    }
    Ok(())
}

/// Whether `dir` is a directory with no entries.
///
/// Unreadable or missing directories count as not empty.
#[must_use]
pub fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_none())
}

/// Compare two paths for equality, handling UNC prefix normalization on Windows.
#[must_use]
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    let normalize = |p: &Path| -> PathBuf {
        #[cfg(windows)]
        {
            let s = p.to_string_lossy();
            if let Some(stripped) = s.strip_prefix(r"\\?\") {
                return PathBuf::from(stripped);
            }
        }
        p.components().collect()
    };

    normalize(a) == normalize(b)
}

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns an error if the link cannot be created.
pub fn create_symlink(target: &Path, link: &Path) -> Result<(), EngineError> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).map_err(EngineError::io("create symlink", link))
    }

    #[cfg(windows)]
    {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
        .map_err(EngineError::io("create symlink", link))
    }
}

/// Remove a symlink (or plain file) at `path`.
///
/// On Windows a directory symlink must be removed with `remove_dir`.
///
/// # Errors
///
/// Returns an error if the entry cannot be removed.
pub fn remove_symlink(path: &Path) -> Result<(), EngineError> {
    #[cfg(windows)]
    {
        if path.is_dir() {
            return fs::remove_dir(path).map_err(EngineError::io("remove", path));
        }
    }
    fs::remove_file(path).map_err(EngineError::io("remove", path))
}
