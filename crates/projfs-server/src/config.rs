//! Command-line and environment configuration.
//!
//! Every setting can come from a flag or an environment variable; flags win.

use anyhow::{Context, Result};
use clap::Parser;
use projfs_core::ProjectRoot;
use std::path::{Path, PathBuf};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Log filter used with `--verbose` when `RUST_LOG` is unset.
pub const VERBOSE_LOG_FILTER: &str = "info,projfs_core=debug,projfs_server=debug";

/// MCP server exposing a project directory over stdio.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "projfs-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Project directory exposed to clients
    ///
    /// Defaults to the parent of the directory holding this executable.
    #[arg(long, env = "PROJECT_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "PROJFS_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging for this server
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Returns the log filter to use when `RUST_LOG` is unset.
    #[must_use]
    pub const fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        }
    }

    /// Opens the configured project root.
    ///
    /// # Errors
    ///
    /// Returns an error if no root is configured and the executable's
    /// location cannot be determined, or if the root is not an existing
    /// directory.
    pub fn project_root(&self) -> Result<ProjectRoot> {
        let path = match &self.root {
            Some(path) => path.clone(),
            None => default_root()?,
        };

        ProjectRoot::new(&path)
            .with_context(|| format!("Failed to open project root {}", path.display()))
    }
}

/// Returns the root used when none is configured.
///
/// The executable is expected to live one level below the project, e.g.
/// `<project>/bin/projfs-mcp`.
///
/// # Errors
///
/// Returns an error if the executable path cannot be determined.
pub fn default_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    Ok(grandparent(&exe))
}

fn grandparent(exe: &Path) -> PathBuf {
    let dir = exe.parent().unwrap_or(exe);
    dir.parent().unwrap_or(dir).to_path_buf()
}
