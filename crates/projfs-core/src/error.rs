//! Error types for project filesystem operations.
//!
//! Every failure carries the caller-supplied path (and the configured root
//! where it matters) so a remote caller can tell what went wrong without
//! access to the server's logs.
//!
//! # Examples
//!
//! ```
//! use projfs_core::FsError;
//! use std::path::PathBuf;
//!
//! let err = FsError::PathEscape {
//!     path: "../../etc/passwd".to_string(),
//!     root: PathBuf::from("/proj"),
//! };
//! assert!(err.is_path_escape());
//! assert!(!err.is_not_found());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for project filesystem operations.
#[derive(Error, Debug)]
pub enum FsError {
    /// The resolved path falls outside the project root.
    ///
    /// Never clamped or rewritten: the request is rejected as a whole.
    #[error("Path '{path}' escapes the project root ({})", root.display())]
    PathEscape {
        /// Path as supplied by the caller
        path: String,
        /// Configured project root
        root: PathBuf,
    },

    /// Nothing exists at the resolved path.
    #[error("Path '{path}' does not exist in the project")]
    NotFound {
        /// Path as supplied by the caller
        path: String,
    },

    /// A directory was expected but something else was found.
    #[error("Path '{path}' is not a directory")]
    NotADirectory {
        /// Path as supplied by the caller
        path: String,
    },

    /// A regular file was expected but something else was found.
    #[error("Path '{path}' is not a regular file")]
    NotAFile {
        /// Path as supplied by the caller
        path: String,
    },

    /// The configured root cannot serve as a project root.
    #[error("Invalid project root '{}': {reason}", path.display())]
    InvalidRoot {
        /// Root as configured
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// The file name pattern is not a valid glob.
    #[error("Invalid file pattern '{pattern}'")]
    InvalidPattern {
        /// Pattern as supplied by the caller
        pattern: String,
        /// Underlying glob parse error
        #[source]
        source: globset::Error,
    },

    /// Unanticipated I/O failure (permission denied, device error, ...).
    #[error("I/O error on '{path}'")]
    Io {
        /// Path the operation was touching
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed part-way.
    #[error("Directory walk failed")]
    Walk(#[from] walkdir::Error),
}

impl FsError {
    /// Returns `true` if the request tried to leave the project root.
    ///
    /// # Examples
    ///
    /// ```
    /// use projfs_core::FsError;
    /// use std::path::PathBuf;
    ///
    /// let err = FsError::PathEscape {
    ///     path: "..".to_string(),
    ///     root: PathBuf::from("/proj"),
    /// };
    /// assert!(err.is_path_escape());
    /// ```
    #[must_use]
    pub const fn is_path_escape(&self) -> bool {
        matches!(self, Self::PathEscape { .. })
    }

    /// Returns `true` if the target is missing or of the wrong kind.
    ///
    /// Wrong-kind targets (a directory where a file was expected, or the
    /// reverse) are reported as not-found, matching how callers recover
    /// from them.
    ///
    /// # Examples
    ///
    /// ```
    /// use projfs_core::FsError;
    ///
    /// let err = FsError::NotAFile {
    ///     path: "src".to_string(),
    /// };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::NotADirectory { .. } | Self::NotAFile { .. }
        )
    }

    /// Returns `true` if the caller supplied an unusable argument.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::PathEscape { .. } | Self::InvalidPattern { .. })
    }

    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for project filesystem operations.
pub type Result<T> = std::result::Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_escape_detection() {
        let err = FsError::PathEscape {
            path: "../x".to_string(),
            root: PathBuf::from("/proj"),
        };
        assert!(err.is_path_escape());
        assert!(err.is_invalid_argument());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_family() {
        let missing = FsError::NotFound {
            path: "a".to_string(),
        };
        let not_dir = FsError::NotADirectory {
            path: "b".to_string(),
        };
        let not_file = FsError::NotAFile {
            path: "c".to_string(),
        };
        assert!(missing.is_not_found());
        assert!(not_dir.is_not_found());
        assert!(not_file.is_not_found());
        assert!(!missing.is_path_escape());
    }

    #[test]
    fn test_io_is_generic_failure() {
        let err = FsError::io(
            "src/a.ts",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_not_found());
        assert!(!err.is_invalid_argument());
        assert!(err.to_string().contains("src/a.ts"));
    }

    #[test]
    fn test_error_display_mentions_root() {
        let err = FsError::PathEscape {
            path: "../../etc/passwd".to_string(),
            root: PathBuf::from("/proj"),
        };
        let display = format!("{err}");
        assert!(display.contains("../../etc/passwd"));
        assert!(display.contains("/proj"));
    }
}
