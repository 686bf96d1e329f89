//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! Each handler resolves its reference through [`locate`], then reads or
//! writes the log and formats the result.

mod append;
mod get;
mod path;
mod show;
mod verify;

// Re-export command functions for testing and direct invocation
pub use append::append;
pub use get::get;
pub use path::path;
pub use show::show;
pub use verify::verify;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::cli::Context;
use crate::core::paths::RepoPaths;
use crate::core::types::RefName;
use crate::reflog::RefLog;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Show {
            refname,
            json,
            reverse,
            limit,
        } => show::show(ctx, &refname, json, reverse, limit),
        Command::Get {
            index,
            refname,
            json,
        } => get::get(ctx, index, &refname, json),
        Command::Append {
            refname,
            old,
            new,
            message,
            name,
            email,
            no_write,
        } => append::append(
            ctx,
            &refname,
            &old,
            &new,
            &message,
            name.zip(email),
            !no_write,
        ),
        Command::Path { refname } => path::path(ctx, &refname),
        Command::Verify { refname } => verify::verify(ctx, &refname),
    }
}

/// A reference resolved against a repository.
pub(crate) struct Located {
    pub paths: RepoPaths,
    pub refname: RefName,
    pub log_path: PathBuf,
}

/// Resolve a user-supplied reference to its log.
pub(crate) fn locate(ctx: &Context, refname: &str) -> Result<Located> {
    let paths = ctx.repo_paths()?;
    let refname =
        RefName::from_short(refname).with_context(|| format!("Invalid ref name '{}'", refname))?;
    let log_path = RefLog::path(&paths, &refname);
    Ok(Located {
        paths,
        refname,
        log_path,
    })
}

/// The short form git uses in `@{n}` selectors.
pub(crate) fn display_name(refname: &RefName) -> &str {
    refname
        .strip_prefix("refs/heads/")
        .unwrap_or_else(|| refname.as_str())
}
