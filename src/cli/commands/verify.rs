//! verify command - Check that a log parses and re-encodes to identical bytes

use super::locate;
use crate::cli::Context;
use crate::reflog::RefLog;
use anyhow::{bail, Context as _, Result};

/// Parse every line of `refname`'s log and compare its re-encoding with
/// the bytes on disk.
pub fn verify(ctx: &Context, refname: &str) -> Result<()> {
    let located = locate(ctx, refname)?;
    let path = &located.log_path;
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut rest: &[u8] = &bytes;
    let mut count = 0usize;
    for entry in RefLog::iter_entries(bytes.as_slice()) {
        let entry = entry.with_context(|| format!("{} is not a valid reflog", path.display()))?;
        count += 1;

        let len = rest
            .iter()
            .position(|b| *b == b'\n')
            .map_or(rest.len(), |pos| pos + 1);
        let (original, tail) = rest.split_at(len);
        if original != entry.encode_line().as_slice() {
            bail!(
                "{} line {} does not re-encode to the same bytes",
                path.display(),
                count
            );
        }
        rest = tail;
    }

    if !ctx.quiet {
        println!("ok: {} entries in {}", count, path.display());
    }
    Ok(())
}
