//! MCP server implementation for project filesystem access.
//!
//! The `ProjectFsService` provides five tools:
//! 1. `get_project_root` - Absolute path of the exposed root
//! 2. `list_project_files` - Recursive listing, capped
//! 3. `read_project_file` - Bounded read with truncation notice
//! 4. `write_project_file` - Create or overwrite a file
//! 5. `search_in_project` - Literal line search, capped
//!
//! Filesystem work runs on tokio's blocking pool; the core operations are
//! synchronous.

use crate::types::{
    ListProjectFilesParams, ListProjectFilesResult, MatchInfo, ReadProjectFileParams,
    SearchInProjectParams, SearchInProjectResult, WriteProjectFileParams,
};
use projfs_core::{
    FsError, ListOptions, ProjectRoot, ReadOptions, SearchOptions, WriteOptions, list, read,
    search, write,
};
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{ErrorData as McpError, tool, tool_handler, tool_router};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// MCP server exposing one project directory.
///
/// Every path a client supplies is resolved against the configured root and
/// rejected if it lands outside it.
///
/// # Examples
///
/// ```no_run
/// use projfs_core::ProjectRoot;
/// use projfs_server::ProjectFsService;
///
/// # fn example() -> anyhow::Result<()> {
/// let root = ProjectRoot::new("/path/to/project")?;
/// let service = ProjectFsService::new(root);
/// // Service implements rmcp ServerHandler trait
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProjectFsService {
    /// Immutable project root shared with blocking tasks
    root: Arc<ProjectRoot>,

    /// Tool router for MCP protocol
    tool_router: ToolRouter<Self>,
}

impl ProjectFsService {
    /// Creates a service for `root`.
    #[must_use]
    pub fn new(root: ProjectRoot) -> Self {
        Self {
            root: Arc::new(root),
            tool_router: Self::tool_router(),
        }
    }

    /// Returns the project root this service exposes.
    #[must_use]
    pub fn root(&self) -> &ProjectRoot {
        &self.root
    }

    /// Runs a core operation on the blocking pool.
    async fn run_blocking<T, F>(&self, op: F) -> Result<T, McpError>
    where
        T: Send + 'static,
        F: FnOnce(&ProjectRoot) -> projfs_core::Result<T> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|e| McpError::internal_error(format!("Task join error: {e}"), None))?
            .map_err(|e| to_mcp_error(&e))
    }
}

#[tool_router]
impl ProjectFsService {
    /// Return the absolute project root.
    #[tool(description = "Return the absolute path of the project root this server exposes.")]
    async fn get_project_root(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            self.root.path().display().to_string(),
        )]))
    }

    /// List files (and optionally directories) under a project folder.
    #[tool(
        description = "List files, and optionally directories, under a folder of the project. Paths are relative to the project root. Stops after max_items entries."
    )]
    async fn list_project_files(
        &self,
        Parameters(params): Parameters<ListProjectFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(
            subdir = %params.subdir,
            max_items = params.max_items,
            include_dirs = params.include_dirs,
            "list_project_files"
        );

        let options = ListOptions::new()
            .with_max_items(params.max_items)
            .with_dirs(params.include_dirs);
        let subdir = params.subdir;
        let entries = self
            .run_blocking(move |root| list(root, &subdir, &options))
            .await?;

        let files: Vec<String> = entries.into_iter().map(|entry| entry.path).collect();
        json_result(&ListProjectFilesResult {
            total: files.len(),
            files,
        })
    }

    /// Read a project file within a byte budget.
    #[tool(
        description = "Read a file of the project. Returns at most max_bytes bytes; longer files end with a notice saying how many bytes were left out."
    )]
    async fn read_project_file(
        &self,
        Parameters(params): Parameters<ReadProjectFileParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(path = %params.path, max_bytes = params.max_bytes, "read_project_file");

        let options = ReadOptions::new().with_max_bytes(params.max_bytes);
        let path = params.path;
        let result = self
            .run_blocking(move |root| read(root, &path, &options))
            .await?;

        Ok(CallToolResult::success(vec![Content::text(result.render())]))
    }

    /// Create or overwrite a project file.
    #[tool(
        description = "Write (create or overwrite) a file of the project with the given content. Set create_dirs to create missing parent folders. Use only when the user explicitly asks for a change."
    )]
    async fn write_project_file(
        &self,
        Parameters(params): Parameters<WriteProjectFileParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(
            path = %params.path,
            bytes = params.content.len(),
            create_dirs = params.create_dirs,
            "write_project_file"
        );

        let options = WriteOptions::new().with_create_dirs(params.create_dirs);
        let WriteProjectFileParams { path, content, .. } = params;
        let outcome = self
            .run_blocking(move |root| write(root, &path, &content, &options))
            .await?;

        Ok(CallToolResult::success(vec![Content::text(
            outcome.to_string(),
        )]))
    }

    /// Search project files for a literal string.
    #[tool(
        description = "Search project files whose name matches file_pattern for lines containing query (case-sensitive). Returns path, 1-based line number and the trimmed line for each match, up to max_results."
    )]
    async fn search_in_project(
        &self,
        Parameters(params): Parameters<SearchInProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(
            query = %params.query,
            file_pattern = %params.file_pattern,
            max_results = params.max_results,
            "search_in_project"
        );

        let options = SearchOptions::new()
            .with_file_pattern(params.file_pattern)
            .with_max_results(params.max_results);
        let query = params.query;
        let found = self
            .run_blocking(move |root| search(root, &query, &options))
            .await?;

        let matches: Vec<MatchInfo> = found.into_iter().map(MatchInfo::from).collect();
        json_result(&SearchInProjectResult {
            total: matches.len(),
            matches,
        })
    }
}

#[tool_handler]
impl ServerHandler for ProjectFsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "projfs-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(format!(
                "Read-write access to the project at {}. All paths are relative to that root; \
                 use list_project_files and search_in_project to explore, read_project_file \
                 to inspect and write_project_file only for changes the user asked for.",
                self.root
            )),
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Serializes a tool result as pretty JSON text content.
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Failed to serialize result: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Maps a core error onto an MCP error with diagnostic data.
fn to_mcp_error(err: &FsError) -> McpError {
    let message = describe(err);
    match err {
        FsError::PathEscape { path, root } => McpError::invalid_params(
            message,
            Some(json!({ "path": path, "root": root.display().to_string() })),
        ),
        FsError::InvalidPattern { pattern, .. } => {
            McpError::invalid_params(message, Some(json!({ "pattern": pattern })))
        }
        FsError::NotFound { path } | FsError::NotADirectory { path } | FsError::NotAFile { path } => {
            McpError::resource_not_found(message, Some(json!({ "path": path })))
        }
        FsError::Io { path, .. } => {
            McpError::internal_error(message, Some(json!({ "path": path })))
        }
        FsError::Walk(e) => McpError::internal_error(
            message,
            e.path()
                .map(|p| json!({ "path": p.display().to_string() })),
        ),
        FsError::InvalidRoot { .. } => McpError::internal_error(message, None),
    }
}

/// Renders an error with its source chain.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
