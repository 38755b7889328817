//! Bounded file reads.
//!
//! At most `max_bytes` bytes are ever pulled into memory; the original size
//! comes from file metadata. Oversized files are cut on a byte boundary and
//! the rendered output names how many bytes were withheld.

use crate::decode::{decode_prefix, decode_text};
use crate::error::{FsError, Result};
use crate::root::ProjectRoot;
use serde::Serialize;
use std::fs::File;
use std::io::Read;

/// Default read budget in bytes.
pub const DEFAULT_MAX_BYTES: usize = 20_000;

/// Options for [`read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Byte budget for returned content
    pub max_bytes: usize,
}

impl ReadOptions {
    /// Creates options with the default budget (20 000 bytes).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    /// Sets the byte budget.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// How much of a file was withheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Truncation {
    /// Size of the file on disk
    pub original_byte_length: u64,
    /// Bytes past the budget that were not returned
    pub truncated_byte_count: u64,
}

/// Content returned by [`read`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadResult {
    /// Root-relative path of the file
    pub path: String,
    /// Decoded content (the leading `max_bytes` bytes when truncated)
    pub content: String,
    /// `true` if invalid UTF-8 was replaced while decoding
    pub lossy: bool,
    /// Present when the file exceeded the budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Truncation>,
}

impl ReadResult {
    /// Returns `true` if part of the file was withheld.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    /// Renders the caller-facing text: the content, followed by a notice
    /// when the file was truncated and another when invalid UTF-8 was
    /// replaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use projfs_core::{ReadResult, Truncation};
    ///
    /// let result = ReadResult {
    ///     path: "src/big.ts".to_string(),
    ///     content: "abc".to_string(),
    ///     lossy: false,
    ///     truncation: Some(Truncation {
    ///         original_byte_length: 10,
    ///         truncated_byte_count: 7,
    ///     }),
    /// };
    /// assert_eq!(
    ///     result.render(),
    ///     "abc\n\n...[content truncated: 7 more bytes in 'src/big.ts']..."
    /// );
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let mut text = self.content.clone();
        if let Some(t) = &self.truncation {
            text.push_str(&format!(
                "\n\n...[content truncated: {} more bytes in '{}']...",
                t.truncated_byte_count, self.path
            ));
        }
        if self.lossy {
            text.push_str(&format!(
                "\n\n...[invalid UTF-8 replaced with U+FFFD in '{}']...",
                self.path
            ));
        }
        text
    }
}

/// Reads a project file within a byte budget.
///
/// # Errors
///
/// Returns [`FsError::PathEscape`] if `path` leaves the root,
/// [`FsError::NotFound`] if nothing exists there, [`FsError::NotAFile`] if
/// it is not a regular file, and [`FsError::Io`] on read failures.
///
/// # Examples
///
/// ```
/// use projfs_core::{ProjectRoot, ReadOptions, read};
/// # use tempfile::TempDir;
///
/// # let temp = TempDir::new().unwrap();
/// std::fs::write(temp.path().join("notes.txt"), "hello world").unwrap();
/// let root = ProjectRoot::new(temp.path()).unwrap();
///
/// let full = read(&root, "notes.txt", &ReadOptions::default()).unwrap();
/// assert_eq!(full.render(), "hello world");
///
/// let cut = read(&root, "notes.txt", &ReadOptions::new().with_max_bytes(5)).unwrap();
/// assert_eq!(cut.content, "hello");
/// assert_eq!(cut.truncation.unwrap().truncated_byte_count, 6);
/// ```
pub fn read(root: &ProjectRoot, path: &str, options: &ReadOptions) -> Result<ReadResult> {
    let resolved = root.resolve(path)?;
    let target = resolved.as_path();

    if !target.exists() {
        return Err(FsError::NotFound {
            path: path.to_string(),
        });
    }
    if !target.is_file() {
        return Err(FsError::NotAFile {
            path: path.to_string(),
        });
    }

    let file = File::open(target).map_err(|e| FsError::io(path, e))?;
    let metadata_len = file.metadata().map_err(|e| FsError::io(path, e))?.len();

    let budget = u64::try_from(options.max_bytes).unwrap_or(u64::MAX);
    let mut bytes = Vec::with_capacity(options.max_bytes.min(64 * 1024));
    file.take(budget)
        .read_to_end(&mut bytes)
        .map_err(|e| FsError::io(path, e))?;

    // The file may have grown since the metadata call; never report fewer
    // bytes than were actually read.
    let original_byte_length = metadata_len.max(bytes.len() as u64);

    let result = if original_byte_length > budget {
        let decoded = decode_prefix(&bytes);
        tracing::debug!(
            path = resolved.relative(),
            original_byte_length,
            budget,
            "truncated oversized file"
        );
        ReadResult {
            path: resolved.relative().to_string(),
            content: decoded.text,
            lossy: decoded.lossy,
            truncation: Some(Truncation {
                original_byte_length,
                truncated_byte_count: original_byte_length - budget,
            }),
        }
    } else {
        let decoded = decode_text(&bytes);
        ReadResult {
            path: resolved.relative().to_string(),
            content: decoded.text,
            lossy: decoded.lossy,
            truncation: None,
        }
    };

    Ok(result)
}
