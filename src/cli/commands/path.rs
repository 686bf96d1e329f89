//! path command - Print where a reference's log is stored

use super::locate;
use crate::cli::Context;
use anyhow::Result;

/// Print the log path of `refname`. The file need not exist.
pub fn path(ctx: &Context, refname: &str) -> Result<()> {
    let located = locate(ctx, refname)?;
    println!("{}", located.log_path.display());
    Ok(())
}
