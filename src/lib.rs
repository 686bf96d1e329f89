//! reflog - read and write git reference logs
//!
//! A library and small CLI for the per-reference history files git keeps
//! under `.git/logs/`. Lines round-trip byte for byte, so a log loaded and
//! written back unchanged is identical on disk.
//!
//! # Architecture
//!
//! - [`core`] - Object ids, ref names, identity, config and repository paths
//! - [`reflog`] - Entries, whole logs, indexed lookup and locking
//! - [`cli`] - Command-line interface over the two layers above
//!
//! # Correctness Invariants
//!
//! 1. Decoding then encoding a well-formed line reproduces its bytes
//! 2. A malformed line is reported, never skipped
//! 3. Whole-log rewrites are atomic
//! 4. Entry order on disk is the order of updates

pub mod cli;
pub mod core;
pub mod reflog;
