//! core
//!
//! Domain types, identity, configuration and repository layout.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, RefName
//! - [`actor`] - Committer identity and its resolution
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Repository discovery and log locations

pub mod actor;
pub mod config;
pub mod paths;
pub mod types;
