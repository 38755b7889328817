//! Parameter and result types for the project filesystem tools.
//!
//! Defaults live here, in the schemas the MCP client sees, so a caller that
//! omits an optional argument gets the same behavior it is told about.

use projfs_core::{
    DEFAULT_FILE_PATTERN, DEFAULT_MAX_BYTES, DEFAULT_MAX_ITEMS, DEFAULT_MAX_RESULTS, SearchMatch,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_subdir() -> String {
    ".".to_string()
}

const fn default_max_items() -> usize {
    DEFAULT_MAX_ITEMS
}

const fn default_max_bytes() -> usize {
    DEFAULT_MAX_BYTES
}

fn default_file_pattern() -> String {
    DEFAULT_FILE_PATTERN.to_string()
}

const fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

// ============================================================================
// list_project_files
// ============================================================================

/// Parameters for listing project files.
///
/// # Examples
///
/// ```
/// use projfs_server::types::ListProjectFilesParams;
///
/// let params: ListProjectFilesParams = serde_json::from_str("{}").unwrap();
/// assert_eq!(params.subdir, ".");
/// assert_eq!(params.max_items, 200);
/// assert!(!params.include_dirs);
/// ```
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListProjectFilesParams {
    /// Folder relative to the project root (default: ".")
    #[serde(default = "default_subdir")]
    pub subdir: String,

    /// Maximum number of entries to return (default: 200)
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Also list directories (default: false)
    #[serde(default)]
    pub include_dirs: bool,
}

/// Result from listing project files.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListProjectFilesResult {
    /// Root-relative paths, `/`-separated
    pub files: Vec<String>,

    /// Number of paths returned
    pub total: usize,
}

// ============================================================================
// read_project_file
// ============================================================================

/// Parameters for reading a project file.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadProjectFileParams {
    /// File path relative to the project root (e.g. "src/App.tsx")
    pub path: String,

    /// Maximum number of bytes to return (default: 20000)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

// ============================================================================
// write_project_file
// ============================================================================

/// Parameters for writing a project file.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WriteProjectFileParams {
    /// File path relative to the project root (e.g. "src/components/New.tsx")
    pub path: String,

    /// Complete new file content
    pub content: String,

    /// Create missing parent directories (default: false)
    #[serde(default)]
    pub create_dirs: bool,
}

// ============================================================================
// search_in_project
// ============================================================================

/// Parameters for searching the project.
///
/// # Examples
///
/// ```
/// use projfs_server::types::SearchInProjectParams;
///
/// let params: SearchInProjectParams =
///     serde_json::from_str(r#"{"query": "useStore"}"#).unwrap();
/// assert_eq!(params.file_pattern, "*.ts*");
/// assert_eq!(params.max_results, 50);
/// ```
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchInProjectParams {
    /// Text to look for (literal, case-sensitive)
    pub query: String,

    /// Shell-style file name pattern, e.g. "*.tsx", "*.json" (default: "*.ts*")
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,

    /// Maximum number of matches to return (default: 50)
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Result from searching the project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchInProjectResult {
    /// Matching lines in walk order
    pub matches: Vec<MatchInfo>,

    /// Number of matches returned
    pub total: usize,
}

/// A single matching line.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MatchInfo {
    /// Root-relative path of the file
    pub path: String,

    /// 1-based line number
    pub line: usize,

    /// The matching line, trimmed
    pub snippet: String,

    /// Set when the line contained invalid UTF-8 that was replaced
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub lossy: bool,
}

impl From<SearchMatch> for MatchInfo {
    fn from(found: SearchMatch) -> Self {
        Self {
            path: found.path,
            line: found.line,
            snippet: found.snippet,
            lossy: found.lossy,
        }
    }
}
