//! show command - List the entries of a reference's log

use super::{display_name, locate};
use crate::cli::Context;
use crate::reflog::{RefLog, RefLogEntry};
use anyhow::{bail, Context as _, Result};
use serde::Serialize;

/// One listed entry with its `@{n}` position, 0 being the newest.
#[derive(Debug, Serialize)]
struct Row<'a> {
    selector: usize,
    #[serde(flatten)]
    entry: &'a RefLogEntry,
}

/// List the entries of `refname`'s log.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `refname` - Reference as typed by the user
/// * `json` - Print JSON instead of one line per entry
/// * `reverse` - Oldest first
/// * `limit` - Keep only the newest `limit` entries
pub fn show(
    ctx: &Context,
    refname: &str,
    json: bool,
    reverse: bool,
    limit: Option<usize>,
) -> Result<()> {
    let located = locate(ctx, refname)?;
    if !located.log_path.exists() {
        bail!("No reflog for '{}'", located.refname);
    }

    let log = RefLog::from_file(&located.log_path)
        .with_context(|| format!("Failed to read reflog of {}", located.refname))?;

    let mut rows: Vec<Row<'_>> = log
        .iter()
        .rev()
        .enumerate()
        .map(|(selector, entry)| Row { selector, entry })
        .collect();
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    if reverse {
        rows.reverse();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let name = display_name(&located.refname);
    for row in &rows {
        println!(
            "{} {}@{{{}}}: {}",
            row.entry.new_oid().short(7),
            name,
            row.selector,
            row.entry.message()
        );
    }

    Ok(())
}
