//! Project root and path confinement.
//!
//! [`ProjectRoot`] holds the canonical root directory and is the only way to
//! obtain a [`ResolvedPath`]. Resolution canonicalizes first and checks
//! containment afterwards, so `..` segments and symlinks cannot slip past a
//! check done on the unnormalized input.
//!
//! # Examples
//!
//! ```
//! use projfs_core::ProjectRoot;
//! # use tempfile::TempDir;
//!
//! # let temp = TempDir::new().unwrap();
//! let root = ProjectRoot::new(temp.path()).unwrap();
//!
//! let resolved = root.resolve("src/../README.md").unwrap();
//! assert_eq!(resolved.relative(), "README.md");
//!
//! let escape = root.resolve("../../etc/passwd").unwrap_err();
//! assert!(escape.is_path_escape());
//! ```

use crate::error::{FsError, Result};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Canonical, immutable project root.
///
/// Constructed once and shared by reference; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    path: PathBuf,
}

impl ProjectRoot {
    /// Canonicalizes `path` and wraps it as a project root.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::InvalidRoot`] if the path does not exist, cannot be
    /// canonicalized, or is not a directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let canonical = path.canonicalize().map_err(|e| FsError::InvalidRoot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !canonical.is_dir() {
            return Err(FsError::InvalidRoot {
                path: path.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        Ok(Self { path: canonical })
    }

    /// Returns the canonical root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves a caller-supplied path inside the root.
    ///
    /// The target does not need to exist: the longest existing ancestor is
    /// canonicalized through the filesystem and the remaining components are
    /// applied one by one, following dangling symlinks to their targets. The
    /// result must be the root itself or lie beneath it, compared
    /// component-wise.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::PathEscape`] when the canonical result lies outside
    /// the root, and [`FsError::Io`] if no ancestor can be canonicalized or
    /// the symlinks form a loop.
    pub fn resolve(&self, relative: &str) -> Result<ResolvedPath> {
        let joined = self.path.join(relative);
        let canonical = canonicalize_lenient(&joined).map_err(|e| FsError::io(relative, e))?;

        if !canonical.starts_with(&self.path) {
            tracing::warn!(
                path = relative,
                root = %self.path.display(),
                "rejected path outside project root"
            );
            return Err(FsError::PathEscape {
                path: relative.to_string(),
                root: self.path.clone(),
            });
        }

        let relative_display = self.relativize(&canonical);
        Ok(ResolvedPath {
            absolute: canonical,
            relative: relative_display,
        })
    }

    /// Renders a path beneath the root as a `/`-separated relative string.
    ///
    /// The root itself renders as `"."`. Paths outside the root are rendered
    /// unchanged; callers only pass paths obtained from resolution or from a
    /// walk that started inside the root.
    #[must_use]
    pub fn relativize(&self, path: &Path) -> String {
        match path.strip_prefix(&self.path) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => normalize_separators(rel),
            Err(_) => normalize_separators(path),
        }
    }
}

impl fmt::Display for ProjectRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A path proven to lie inside the project root at resolution time.
///
/// Only [`ProjectRoot::resolve`] creates these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: String,
}

impl ResolvedPath {
    /// Canonical absolute location.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// Root-relative, `/`-separated rendering.
    #[must_use]
    pub fn relative(&self) -> &str {
        &self.relative
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.absolute
    }
}

fn normalize_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Symlink hops followed in the non-existing tail before giving up.
const MAX_SYMLINK_HOPS: usize = 40;

/// Canonicalizes the longest existing ancestor of `path`, then applies the
/// remaining components one at a time.
///
/// `canonicalize` fails on a dangling symlink, so such a link ends up in the
/// tail. Each tail component is checked with `symlink_metadata`; a link is
/// replaced by its target, resolved relative to the link's parent, before
/// the walk continues.
fn canonicalize_lenient(path: &Path) -> std::io::Result<PathBuf> {
    resolve_lenient(path, 0)
}

fn resolve_lenient(path: &Path, hops: usize) -> std::io::Result<PathBuf> {
    if hops > MAX_SYMLINK_HOPS {
        return Err(std::io::Error::other(format!(
            "too many levels of symbolic links: {}",
            path.display()
        )));
    }

    let mut last_err = None;

    for ancestor in path.ancestors() {
        match ancestor.canonicalize() {
            Ok(mut base) => {
                let tail = path.strip_prefix(ancestor).unwrap_or_else(|_| Path::new(""));
                for component in tail.components() {
                    match component {
                        Component::CurDir => {}
                        Component::ParentDir => {
                            base.pop();
                        }
                        Component::Normal(segment) => {
                            base.push(segment);
                            if is_symlink(&base) {
                                let target = std::fs::read_link(&base)?;
                                base.pop();
                                base = resolve_lenient(&base.join(target), hops + 1)?;
                            }
                        }
                        // `strip_prefix` leaves only relative components.
                        Component::RootDir | Component::Prefix(_) => {}
                    }
                }
                return Ok(base);
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound)))
}

fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .is_ok_and(|meta| meta.file_type().is_symlink())
}
