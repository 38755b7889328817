//! Literal text search across the project tree.
//!
//! The walk starts at the root, visits children in file-name order and never
//! follows symlinks, so every file it opens lies inside the root. Files are
//! read one line at a time and the search stops as soon as the consumer has
//! enough matches, without finishing the current file.
//!
//! Lines end at `\n`, with an optional `\r` before it stripped. A bare `\r`
//! does not end a line, so a file using only CR line endings is a single
//! line and every match in it reports line 1.

use crate::decode::decode_text;
use crate::error::{FsError, Result};
use crate::root::ProjectRoot;
use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use walkdir::WalkDir;

/// Default file name pattern.
pub const DEFAULT_FILE_PATTERN: &str = "*.ts*";

/// Default cap on returned matches.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Bytes inspected for a NUL byte before a file is treated as binary.
const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// Options for [`search`].
///
/// # Examples
///
/// ```
/// use projfs_core::SearchOptions;
///
/// let options = SearchOptions::default().with_file_pattern("*.rs").with_max_results(5);
/// assert_eq!(options.file_pattern, "*.rs");
/// assert_eq!(options.max_results, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Shell-style glob matched against file names
    pub file_pattern: String,
    /// Maximum number of matches returned
    pub max_results: usize,
}

impl SearchOptions {
    /// Creates options with defaults (`*.ts*`, 50 matches).
    #[must_use]
    pub fn new() -> Self {
        Self {
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Sets the file name pattern.
    #[must_use]
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    /// Sets the match cap.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A line containing the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Root-relative path of the file
    pub path: String,
    /// 1-based line number
    pub line: usize,
    /// The line, trimmed
    pub snippet: String,
    /// `true` if the line contained invalid UTF-8 that was replaced
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub lossy: bool,
}

/// The file currently being scanned.
struct OpenFile {
    relative: String,
    reader: BufReader<File>,
    line_no: usize,
}

/// Lazy search over the project tree.
///
/// Yields matches in walk order; dropping the iterator abandons the rest of
/// the walk.
pub struct SearchIter<'a> {
    root: &'a ProjectRoot,
    query: String,
    matcher: GlobMatcher,
    walker: walkdir::IntoIter,
    current: Option<OpenFile>,
    buf: Vec<u8>,
}

impl fmt::Debug for SearchIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIter")
            .field("root", &self.root)
            .field("query", &self.query)
            .field("pattern", &self.matcher.glob().glob())
            .field(
                "current",
                &self.current.as_ref().map(|file| file.relative.as_str()),
            )
            .finish_non_exhaustive()
    }
}

impl SearchIter<'_> {
    /// Opens the next matching text file, skipping binary and unreadable
    /// ones. Returns `None` once the walk is exhausted.
    fn open_next(&mut self) -> Option<Result<OpenFile>> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(FsError::Walk(e))),
            };

            if !entry.file_type().is_file() || !self.matcher.is_match(entry.file_name()) {
                continue;
            }

            let relative = self.root.relativize(entry.path());
            match open_text(entry.path()) {
                Ok(Some(reader)) => {
                    return Some(Ok(OpenFile {
                        relative,
                        reader,
                        line_no: 0,
                    }));
                }
                Ok(None) => tracing::debug!(path = %relative, "skipping binary file"),
                Err(e) => tracing::debug!(path = %relative, error = %e, "skipping unreadable file"),
            }
        }
    }

    /// Scans the current file for the next matching line.
    fn next_in_current(&mut self) -> Option<SearchMatch> {
        let file = self.current.as_mut()?;

        loop {
            self.buf.clear();
            match file.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(path = %file.relative, error = %e, "stopped reading file");
                    return None;
                }
            }
            file.line_no += 1;

            let line = strip_line_ending(&self.buf);
            let decoded = decode_text(line);
            if decoded.text.contains(self.query.as_str()) {
                return Some(SearchMatch {
                    path: file.relative.clone(),
                    line: file.line_no,
                    snippet: decoded.text.trim().to_string(),
                    lossy: decoded.lossy,
                });
            }
        }
    }
}

impl Iterator for SearchIter<'_> {
    type Item = Result<SearchMatch>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(found) = self.next_in_current() {
                return Some(Ok(found));
            }
            match self.open_next()? {
                Ok(file) => self.current = Some(file),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Opens `path` for line reading, or returns `Ok(None)` if its first block
/// contains a NUL byte.
fn open_text(path: &Path) -> std::io::Result<Option<BufReader<File>>> {
    let mut reader = BufReader::with_capacity(BINARY_SNIFF_LEN, File::open(path)?);
    let head = reader.fill_buf()?;
    if head.contains(&0) {
        return Ok(None);
    }
    Ok(Some(reader))
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Compiles a shell-style file name pattern.
///
/// # Errors
///
/// Returns [`FsError::InvalidPattern`] if the glob does not parse.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|source| FsError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Starts a lazy search for `query` in files whose name matches `file_pattern`.
///
/// # Errors
///
/// Returns [`FsError::InvalidPattern`] if `file_pattern` is not a valid glob.
pub fn search_iter<'a>(
    root: &'a ProjectRoot,
    query: &str,
    file_pattern: &str,
) -> Result<SearchIter<'a>> {
    let matcher = compile_pattern(file_pattern)?;
    let walker = WalkDir::new(root.path())
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    Ok(SearchIter {
        root,
        query: query.to_string(),
        matcher,
        walker,
        current: None,
        buf: Vec::new(),
    })
}

/// Searches the project for lines containing `query`.
///
/// Matching is literal and case-sensitive. At most `options.max_results`
/// matches are returned, in walk order.
///
/// # Errors
///
/// Returns [`FsError::InvalidPattern`] for a bad glob and [`FsError::Walk`]
/// if the traversal fails before the cap is reached.
///
/// # Examples
///
/// ```
/// use projfs_core::{ProjectRoot, SearchOptions, search};
/// # use tempfile::TempDir;
///
/// # let temp = TempDir::new().unwrap();
/// std::fs::write(temp.path().join("a.ts"), "let a = 1;\nconst b = 2;\n").unwrap();
/// let root = ProjectRoot::new(temp.path()).unwrap();
///
/// let matches = search(&root, "const", &SearchOptions::default()).unwrap();
/// assert_eq!(matches.len(), 1);
/// assert_eq!(matches[0].line, 2);
/// assert_eq!(matches[0].snippet, "const b = 2;");
/// ```
pub fn search(root: &ProjectRoot, query: &str, options: &SearchOptions) -> Result<Vec<SearchMatch>> {
    let matches = search_iter(root, query, &options.file_pattern)?
        .take(options.max_results)
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        query,
        pattern = %options.file_pattern,
        count = matches.len(),
        "searched project"
    );
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ProjectRoot) {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        fs::create_dir_all(base.join("src/features")).unwrap();
        fs::write(base.join("src/a.ts"), "const x = 1;\nconst y = 2;\n").unwrap();
        fs::write(
            base.join("src/features/View.tsx"),
            "import x from 'y';\n  export const View = () => null;  \n",
        )
        .unwrap();
        fs::write(base.join("README.md"), "const in markdown\n").unwrap();
        let root = ProjectRoot::new(base).unwrap();
        (temp, root)
    }

    #[test]
    fn test_search_default_pattern() {
        let (_temp, root) = setup();
        let matches = search(&root, "const", &SearchOptions::default()).unwrap();

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].path, "src/a.ts");
        assert_eq!(matches[0].line, 1);
        assert_eq!(matches[0].snippet, "const x = 1;");
        assert_eq!(matches[1].line, 2);
        assert_eq!(matches[2].path, "src/features/View.tsx");
        assert_eq!(matches[2].line, 2);
        assert_eq!(matches[2].snippet, "export const View = () => null;");
    }

    #[test]
    fn test_search_custom_pattern() {
        let (_temp, root) = setup();
        let options = SearchOptions::default().with_file_pattern("*.md");
        let matches = search(&root, "const", &options).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, "README.md");
    }

    #[test]
    fn test_search_is_case_sensitive() {
        let (_temp, root) = setup();
        let matches = search(&root, "CONST", &SearchOptions::default()).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_search_stops_at_cap_mid_file() {
        let (_temp, root) = setup();
        let options = SearchOptions::default().with_max_results(1);
        let matches = search(&root, "const", &options).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line, 1);
    }

    #[test]
    fn test_search_zero_cap() {
        let (_temp, root) = setup();
        let options = SearchOptions::default().with_max_results(0);
        assert!(search(&root, "const", &options).unwrap().is_empty());
    }

    #[test]
    fn test_search_skips_binary_files() {
        let (temp, root) = setup();
        fs::write(temp.path().join("blob.ts"), b"const\0binary\nconst again\n").unwrap();

        let matches = search(&root, "const", &SearchOptions::default()).unwrap();
        assert!(matches.iter().all(|m| m.path != "blob.ts"));
    }

    #[test]
    fn test_search_lossy_line() {
        let (temp, root) = setup();
        fs::write(temp.path().join("odd.ts"), b"const \xFF here\nconst clean\n").unwrap();

        let options = SearchOptions::default().with_file_pattern("odd.ts");
        let matches = search(&root, "const", &options).unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].lossy);
        assert_eq!(matches[0].snippet, "const \u{FFFD} here");
        assert!(!matches[1].lossy);
    }

    #[test]
    fn test_search_crlf_lines() {
        let (temp, root) = setup();
        fs::write(temp.path().join("win.ts"), "first\r\nconst z = 3;\r\n").unwrap();

        let options = SearchOptions::default().with_file_pattern("win.ts");
        let matches = search(&root, "const", &options).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line, 2);
        assert_eq!(matches[0].snippet, "const z = 3;");
    }

    #[test]
    fn test_search_bare_cr_is_one_line() {
        let (temp, root) = setup();
        fs::write(temp.path().join("mac.ts"), "first\rconst z = 3;\r").unwrap();

        let options = SearchOptions::default().with_file_pattern("mac.ts");
        let matches = search(&root, "const", &options).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line, 1);
        assert_eq!(matches[0].snippet, "first\rconst z = 3;");
    }

    #[test]
    fn test_search_last_line_without_newline() {
        let (temp, root) = setup();
        fs::write(temp.path().join("tail.ts"), "a\nconst tail").unwrap();

        let options = SearchOptions::default().with_file_pattern("tail.ts");
        let matches = search(&root, "const", &options).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line, 2);
    }

    #[test]
    fn test_search_invalid_pattern() {
        let (_temp, root) = setup();
        let options = SearchOptions::default().with_file_pattern("[unclosed");
        let err = search(&root, "const", &options).unwrap_err();
        assert!(matches!(err, FsError::InvalidPattern { .. }));
        assert!(err.is_invalid_argument());
    }

    #[cfg(unix)]
    #[test]
    fn test_search_does_not_follow_symlinks() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("leak.ts"), "const secret = 1;\n").unwrap();
        let (temp, root) = setup();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("linked")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("leak.ts"),
            temp.path().join("direct.ts"),
        )
        .unwrap();

        let matches = search(&root, "secret", &SearchOptions::default()).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_match_serialization_omits_clean_flag() {
        let found = SearchMatch {
            path: "src/a.ts".to_string(),
            line: 1,
            snippet: "const x = 1;".to_string(),
            lossy: false,
        };
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"path": "src/a.ts", "line": 1, "snippet": "const x = 1;"})
        );
    }

    #[test]
    fn test_strip_line_ending() {
        assert_eq!(strip_line_ending(b"abc\r\n"), b"abc");
        assert_eq!(strip_line_ending(b"abc\n"), b"abc");
        assert_eq!(strip_line_ending(b"abc"), b"abc");
    }
}
