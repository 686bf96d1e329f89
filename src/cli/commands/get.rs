//! get command - Print a single entry by position

use super::locate;
use crate::cli::Context;
use crate::core::config::Config;
use crate::reflog::{RefLog, RefLogEntry};
use anyhow::{Context as _, Result};

/// Print the entry at `index` in `refname`'s log.
///
/// Negative indices read backward from the end of the file using the
/// configured `read.window`.
pub fn get(ctx: &Context, index: isize, refname: &str, json: bool) -> Result<()> {
    let located = locate(ctx, refname)?;
    let config = Config::load(Some(&located.paths)).context("Failed to load config")?;

    let entry = RefLog::entry_at_with_window(&located.log_path, index, config.read_window())
        .with_context(|| format!("Failed to read reflog of {}", located.refname))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        print_entry(&entry);
    }
    Ok(())
}

fn print_entry(entry: &RefLogEntry) {
    let date = entry
        .datetime()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S %z").to_string())
        .unwrap_or_else(|| entry.timestamp().to_string());

    println!("old      {}", entry.old_oid());
    println!("new      {}", entry.new_oid());
    println!("actor    {}", entry.actor());
    println!("date     {}", date);
    println!("message  {}", entry.message());
}
