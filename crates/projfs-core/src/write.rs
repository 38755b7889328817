//! Whole-file writes.
//!
//! Writes overwrite unconditionally. There is no locking, no version check
//! and no backup of the previous content: a write can race a concurrent
//! read or list of the same path, and a concurrent external writer can lose
//! its changes. Callers that need more must coordinate outside this crate.

use crate::error::{FsError, Result};
use crate::root::ProjectRoot;
use serde::Serialize;
use std::fmt;
use std::fs;

/// Options for [`write`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Create missing parent directories
    pub create_dirs: bool,
}

impl WriteOptions {
    /// Creates options with defaults (parents must already exist).
    #[must_use]
    pub const fn new() -> Self {
        Self { create_dirs: false }
    }

    /// Sets whether missing parent directories are created.
    #[must_use]
    pub const fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

/// What [`write`] persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    /// Root-relative path of the written file
    pub path: String,
    /// Number of characters (not bytes) written
    pub chars: usize,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File written: {} ({} characters).", self.path, self.chars)
    }
}

/// Creates or overwrites a project file with `content`.
///
/// # Errors
///
/// Returns [`FsError::PathEscape`] if `path` leaves the root,
/// [`FsError::NotAFile`] if it names an existing directory,
/// [`FsError::NotFound`] if the parent directory is missing and
/// `create_dirs` is off, and [`FsError::Io`] on write failures.
///
/// # Examples
///
/// ```
/// use projfs_core::{ProjectRoot, WriteOptions, write};
/// # use tempfile::TempDir;
///
/// # let temp = TempDir::new().unwrap();
/// let root = ProjectRoot::new(temp.path()).unwrap();
///
/// let options = WriteOptions::new().with_create_dirs(true);
/// let outcome = write(&root, "new/dir/file.txt", "hello", &options).unwrap();
/// assert_eq!(outcome.path, "new/dir/file.txt");
/// assert_eq!(outcome.chars, 5);
/// assert!(temp.path().join("new/dir/file.txt").is_file());
/// ```
pub fn write(
    root: &ProjectRoot,
    path: &str,
    content: &str,
    options: &WriteOptions,
) -> Result<WriteOutcome> {
    let resolved = root.resolve(path)?;
    let target = resolved.as_path();

    if target.is_dir() {
        return Err(FsError::NotAFile {
            path: path.to_string(),
        });
    }

    // The root itself is always a directory, so a resolved file path has a
    // parent inside the root.
    if let Some(parent) = target.parent() {
        if options.create_dirs {
            fs::create_dir_all(parent).map_err(|e| FsError::io(path, e))?;
        } else if !parent.is_dir() {
            return Err(FsError::NotFound {
                path: root.relativize(parent),
            });
        }
    }

    fs::write(target, content).map_err(|e| FsError::io(path, e))?;

    let outcome = WriteOutcome {
        path: resolved.relative().to_string(),
        chars: content.chars().count(),
    };
    tracing::info!(path = %outcome.path, chars = outcome.chars, "wrote project file");
    Ok(outcome)
}
