//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--git-dir <path>`: Use this git directory instead of discovering one
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ref name used when a command's REF argument is omitted.
pub const DEFAULT_REF: &str = "HEAD";

/// reflog - read and write git reference logs
#[derive(Parser, Debug)]
#[command(name = "reflog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if reflog was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Path to the git directory, skipping discovery
    #[arg(long, global = true, value_name = "PATH")]
    pub git_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the entries of a reference's log
    #[command(
        name = "show",
        long_about = "List the entries of a reference's log, newest first.\n\n\
            Each entry is numbered the way git selects it: REF@{0} is the most \
            recent update, REF@{1} the one before it, and so on.",
        after_help = "\
EXAMPLES:
    # Recent updates to HEAD
    reflog show

    # The five most recent updates to a branch
    reflog show main --limit 5

    # Oldest first, as stored on disk
    reflog show refs/heads/main --reverse

    # Machine-readable output
    reflog show --json"
    )]
    Show {
        /// Reference whose log to read (short branch names are expanded)
        #[arg(default_value = DEFAULT_REF)]
        refname: String,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,

        /// Oldest entry first
        #[arg(long)]
        reverse: bool,

        /// Show at most this many of the newest entries
        #[arg(short = 'n', long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Print a single entry by position
    #[command(
        name = "get",
        long_about = "Print a single entry by position.\n\n\
            Non-negative indices count from the oldest entry (0 is the first \
            update ever logged). Negative indices count from the newest (-1 is \
            the latest update) and only read the end of the file.",
        after_help = "\
EXAMPLES:
    # The latest update to HEAD
    reflog get -1

    # The first update ever logged for a branch
    reflog get 0 main --json"
    )]
    Get {
        /// Position in the log; negative counts from the end
        #[arg(allow_negative_numbers = true)]
        index: isize,

        /// Reference whose log to read
        #[arg(default_value = DEFAULT_REF)]
        refname: String,

        /// Print the entry as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record an update in a reference's log
    #[command(
        name = "append",
        long_about = "Record an update in a reference's log.\n\n\
            The entry is stamped with the current time. Without --name/--email \
            the identity comes from GIT_COMMITTER_*, GIT_AUTHOR_*, the [user] \
            config table and EMAIL, in that order.",
        after_help = "\
EXAMPLES:
    reflog append refs/heads/main \\
        0000000000000000000000000000000000000000 \\
        4b825dc642cb6eb9a060e54bf8d69288fbee4904 \\
        -m \"branch: Created from HEAD\""
    )]
    Append {
        /// Reference whose log to extend
        refname: String,

        /// Object id before the update
        old: String,

        /// Object id after the update
        new: String,

        /// One-line description of the update
        #[arg(short, long)]
        message: String,

        /// Actor name, overriding the configured identity
        #[arg(long, requires = "email")]
        name: Option<String>,

        /// Actor email, overriding the configured identity
        #[arg(long, requires = "name")]
        email: Option<String>,

        /// Build and print the entry without writing it
        #[arg(long)]
        no_write: bool,
    },

    /// Print where a reference's log is stored
    #[command(name = "path")]
    Path {
        /// Reference name
        #[arg(default_value = DEFAULT_REF)]
        refname: String,
    },

    /// Check that a log parses and re-encodes to identical bytes
    #[command(name = "verify")]
    Verify {
        /// Reference whose log to check
        #[arg(default_value = DEFAULT_REF)]
        refname: String,
    },
}
