//! cli
//!
//! Command-line interface for reflog.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging
//! - Locate the repository and dispatch to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers resolve a reference to its log path
//! through [`crate::core::paths`] and do all reading and writing through
//! [`crate::reflog`].

pub mod args;
pub mod commands;

pub use args::Cli;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::paths::RepoPaths;

/// Flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Git directory override.
    pub git_dir: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// The directory commands run in.
    pub fn cwd(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir().context("Failed to read current directory"),
        }
    }

    /// Locate the repository, honouring `--git-dir`.
    pub fn repo_paths(&self) -> Result<RepoPaths> {
        let cwd = self.cwd()?;
        let paths = match &self.git_dir {
            Some(git_dir) => RepoPaths::from_git_dir(cwd.join(git_dir)),
            None => RepoPaths::discover(&cwd),
        };
        paths.context("Failed to locate git repository")
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    setup_tracing(cli.debug);

    let ctx = Context {
        cwd: cli.cwd.clone(),
        git_dir: cli.git_dir.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Initialize the `tracing` subscriber on stderr.
///
/// Respects `RUST_LOG` if set, otherwise `debug` under `--debug` and
/// `warn` without it.
fn setup_tracing(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
