//! Recursive directory listing.
//!
//! Children are visited in file-name order, depth first, so the output is
//! stable for an unchanged tree. Symlinks are listed but never followed.

use crate::error::{FsError, Result};
use crate::root::ProjectRoot;
use serde::{Deserialize, Serialize};
use std::fmt;
use walkdir::WalkDir;

/// Default cap on listed entries.
pub const DEFAULT_MAX_ITEMS: usize = 200;

/// Options for [`list`].
///
/// # Examples
///
/// ```
/// use projfs_core::ListOptions;
///
/// let options = ListOptions::default().with_max_items(10).with_dirs(true);
/// assert_eq!(options.max_items, 10);
/// assert!(options.include_dirs);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of entries returned
    pub max_items: usize,
    /// Include directories as well as files
    pub include_dirs: bool,
}

impl ListOptions {
    /// Creates options with defaults (200 entries, files only).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            include_dirs: false,
        }
    }

    /// Sets the entry cap.
    #[must_use]
    pub const fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Sets whether directories are listed.
    #[must_use]
    pub const fn with_dirs(mut self, include_dirs: bool) -> Self {
        self.include_dirs = include_dirs;
        self
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of a listed entry, as seen without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file (or anything that is neither a directory nor a symlink)
    File,
    /// Directory
    Directory,
    /// Symbolic link, listed without following it
    ///
    /// A link that resolves to a directory is only listed when directories
    /// are requested.
    Symlink,
}

/// A listed entry, rendered relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Root-relative, `/`-separated path
    pub path: String,
    /// What the entry is
    pub kind: EntryKind,
}

impl FileEntry {
    /// Returns `true` for directories.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Lazy listing of a subtree.
///
/// Walks only as far as the consumer pulls, so `take(n)` stops the walk after
/// `n` entries.
pub struct ListIter<'a> {
    root: &'a ProjectRoot,
    walker: walkdir::IntoIter,
    include_dirs: bool,
}

impl fmt::Debug for ListIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListIter")
            .field("root", &self.root)
            .field("include_dirs", &self.include_dirs)
            .finish_non_exhaustive()
    }
}

impl Iterator for ListIter<'_> {
    type Item = Result<FileEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(FsError::Walk(e))),
            };

            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_symlink() {
                EntryKind::Symlink
            } else {
                EntryKind::File
            };

            // Links to directories count as directories here, even though the
            // walk never descends into them.
            let dir_like = kind == EntryKind::Directory
                || (kind == EntryKind::Symlink && entry.path().is_dir());
            if dir_like && !self.include_dirs {
                continue;
            }

            return Some(Ok(FileEntry {
                path: self.root.relativize(entry.path()),
                kind,
            }));
        }
    }
}

/// Starts a lazy listing of `subdir`.
///
/// # Errors
///
/// Returns [`FsError::PathEscape`] if `subdir` leaves the root,
/// [`FsError::NotFound`] if it does not exist and [`FsError::NotADirectory`]
/// if it is not a directory.
pub fn list_iter<'a>(
    root: &'a ProjectRoot,
    subdir: &str,
    include_dirs: bool,
) -> Result<ListIter<'a>> {
    let resolved = root.resolve(subdir)?;
    let path = resolved.as_path();

    if !path.exists() {
        return Err(FsError::NotFound {
            path: subdir.to_string(),
        });
    }
    if !path.is_dir() {
        return Err(FsError::NotADirectory {
            path: subdir.to_string(),
        });
    }

    let walker = WalkDir::new(path)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    Ok(ListIter {
        root,
        walker,
        include_dirs,
    })
}

/// Lists up to `options.max_items` entries under `subdir`.
///
/// # Errors
///
/// Same as [`list_iter`], plus [`FsError::Walk`] if the traversal hits an
/// unreadable directory before the cap is reached.
///
/// # Examples
///
/// ```
/// use projfs_core::{ListOptions, ProjectRoot, list};
/// # use tempfile::TempDir;
///
/// # let temp = TempDir::new().unwrap();
/// std::fs::create_dir(temp.path().join("src")).unwrap();
/// std::fs::write(temp.path().join("src/a.ts"), "").unwrap();
/// let root = ProjectRoot::new(temp.path()).unwrap();
///
/// let entries = list(&root, ".", &ListOptions::default()).unwrap();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].path, "src/a.ts");
/// ```
pub fn list(root: &ProjectRoot, subdir: &str, options: &ListOptions) -> Result<Vec<FileEntry>> {
    let entries = list_iter(root, subdir, options.include_dirs)?
        .take(options.max_items)
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(subdir, count = entries.len(), "listed project entries");
    Ok(entries)
}
