//! MCP server for root-confined project filesystem access.
//!
//! Exposes [`projfs_core`] operations as MCP tools over stdio:
//!
//! - `get_project_root` returns the absolute root
//! - `list_project_files` lists a subtree
//! - `read_project_file` reads a file within a byte budget
//! - `write_project_file` creates or overwrites a file
//! - `search_in_project` finds lines containing a literal string
//!
//! # Examples
//!
//! ```no_run
//! use projfs_server::{Config, ProjectFsService};
//! use rmcp::{ServiceExt, transport::stdio};
//!
//! # async fn example(config: Config) -> anyhow::Result<()> {
//! let service = ProjectFsService::new(config.project_root()?);
//! let running = service.serve(stdio()).await?;
//! running.waiting().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod logging;
pub mod service;
pub mod types;

pub use config::Config;
pub use service::ProjectFsService;
