//! MCP server entry point for project filesystem access.
//!
//! # Usage
//!
//! Run the server via stdio transport:
//!
//! ```bash
//! projfs-mcp --root /path/to/project
//! ```
//!
//! Or configure in `~/.config/claude/mcp.json`:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "project-fs": {
//!       "command": "projfs-mcp",
//!       "env": { "PROJECT_ROOT": "/path/to/project" }
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use clap::Parser;
use projfs_server::{Config, ProjectFsService, logging};
use rmcp::ServiceExt;
use rmcp::transport::stdio;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    let _guard = logging::init(&config)?;

    if let Err(e) = run(&config).await {
        tracing::error!("Server stopped with error: {e:#}");
        return Err(e);
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn run(config: &Config) -> Result<()> {
    let root = config.project_root()?;

    tracing::info!(
        root = %root,
        "Starting projfs-mcp v{}",
        env!("CARGO_PKG_VERSION")
    );

    let service = ProjectFsService::new(root).serve(stdio()).await?;
    let reason = service.waiting().await?;

    tracing::debug!(?reason, "Transport closed");
    Ok(())
}
