//! Root-confined access to a project directory tree.
//!
//! This crate exposes an arbitrary project directory to an automated caller
//! while keeping every access inside one configured root and keeping every
//! response bounded, however large the tree or its files.
//!
//! # Architecture
//!
//! - [`ProjectRoot`] holds the canonical root and resolves caller paths,
//!   rejecting anything that lands outside it after `..` and symlinks are
//!   resolved
//! - [`list`] walks a subtree, capped by `max_items`
//! - [`read`] reads a file within a byte budget, truncating on a byte
//!   boundary
//! - [`write`] creates or overwrites a file, optionally creating parents
//! - [`search`] scans matching files line by line for a literal substring,
//!   capped by `max_results`
//!
//! All operations are synchronous and keep no state between calls apart
//! from the immutable root passed in by the caller.
//!
//! # Examples
//!
//! ```
//! use projfs_core::{ListOptions, ProjectRoot, ReadOptions, SearchOptions, WriteOptions};
//! # use tempfile::TempDir;
//!
//! # let temp = TempDir::new().unwrap();
//! let root = ProjectRoot::new(temp.path()).unwrap();
//!
//! let options = WriteOptions::new().with_create_dirs(true);
//! projfs_core::write(&root, "src/a.ts", "const x = 1;\n", &options).unwrap();
//!
//! let files = projfs_core::list(&root, ".", &ListOptions::default()).unwrap();
//! assert_eq!(files[0].path, "src/a.ts");
//!
//! let text = projfs_core::read(&root, "src/a.ts", &ReadOptions::default()).unwrap();
//! assert_eq!(text.content, "const x = 1;\n");
//!
//! let hits = projfs_core::search(&root, "const", &SearchOptions::default()).unwrap();
//! assert_eq!(hits[0].line, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod decode;
mod error;
mod list;
mod read;
mod root;
mod search;
mod write;

pub use error::{FsError, Result};
pub use list::{DEFAULT_MAX_ITEMS, EntryKind, FileEntry, ListIter, ListOptions, list, list_iter};
pub use read::{DEFAULT_MAX_BYTES, ReadOptions, ReadResult, Truncation, read};
pub use root::{ProjectRoot, ResolvedPath};
pub use search::{
    DEFAULT_FILE_PATTERN, DEFAULT_MAX_RESULTS, SearchIter, SearchMatch, SearchOptions,
    compile_pattern, search, search_iter,
};
pub use write::{WriteOptions, WriteOutcome, write};
