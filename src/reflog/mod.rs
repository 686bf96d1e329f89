//! reflog
//!
//! Reading and writing git reference logs.
//!
//! Every reference (`HEAD`, `refs/heads/main`, ...) may have a log under
//! `logs/` recording each update: the old and new object ids, who made the
//! change and when, and a one-line description.
//!
//! # Modules
//!
//! - [`entry`] - One record and its byte-exact line encoding
//! - [`log`] - A whole log, its file binding and indexed lookup
//! - [`tail`] - Backward line reads for negative indices
//! - [`lock`] - Advisory per-reference writer lock
//! - [`error`] - Error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use reflog::core::paths::RepoPaths;
//! use reflog::core::types::RefName;
//! use reflog::reflog::RefLog;
//!
//! let paths = RepoPaths::discover(std::path::Path::new("."))?;
//! let path = RefLog::path(&paths, &RefName::head());
//!
//! let newest = RefLog::entry_at(&path, -1)?;
//! println!("{} {}", newest.new_oid().short(7), newest.message());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod entry;
pub mod error;
pub mod lock;
pub mod log;
pub mod tail;

pub use entry::RefLogEntry;
pub use error::{Field, RefLogError};
pub use lock::{LockError, RefLogLock};
pub use log::{Entries, RefLog};
pub use tail::{TailLine, TailReader};
