//! append command - Record an update in a reference's log
//!
//! Writers hold the reference's [`RefLogLock`] while appending so two
//! `reflog append` processes never interleave on one log.

use super::locate;
use crate::cli::Context;
use crate::core::actor::Actor;
use crate::core::config::Config;
use crate::core::types::Oid;
use crate::reflog::{RefLog, RefLogLock};
use anyhow::{Context as _, Result};
use tracing::debug;

/// Append one entry to `refname`'s log.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `refname` - Reference as typed by the user
/// * `old_hex` / `new_hex` - Object ids before and after the update
/// * `message` - One-line description
/// * `identity` - Explicit `(name, email)`, else resolved from the environment and config
/// * `write` - When false the entry is only built and printed
pub fn append(
    ctx: &Context,
    refname: &str,
    old_hex: &str,
    new_hex: &str,
    message: &str,
    identity: Option<(String, String)>,
    write: bool,
) -> Result<()> {
    let located = locate(ctx, refname)?;
    let old = Oid::from_hex(old_hex).with_context(|| format!("Invalid old object id '{}'", old_hex))?;
    let new = Oid::from_hex(new_hex).with_context(|| format!("Invalid new object id '{}'", new_hex))?;
    let actor = identity
        .map(|(name, email)| Actor::new(name, email))
        .transpose()
        .context("Invalid --name/--email")?;

    let config = Config::load(Some(&located.paths)).context("Failed to load config")?;

    let _lock = if write {
        Some(RefLogLock::wait(&located.paths, &located.refname)?)
    } else {
        None
    };

    let entry = RefLog::append_entry(
        &config,
        &located.log_path,
        &old,
        &new,
        message,
        actor,
        write,
    )
    .with_context(|| format!("Failed to append to reflog of {}", located.refname))?;
    debug!(refname = %located.refname, write, "append finished");

    if !ctx.quiet {
        println!("{}", entry);
    }
    Ok(())
}
