//! reflog::error
//!
//! Error taxonomy for reflog parsing, lookup and persistence.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::types::TypeError;

/// The part of a log line that failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    OldSha,
    NewSha,
    Actor,
    Timestamp,
    Separator,
    Message,
}

impl Field {
    /// Short name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::OldSha => "old-sha",
            Field::NewSha => "new-sha",
            Field::Actor => "actor",
            Field::Timestamp => "timestamp",
            Field::Separator => "separator",
            Field::Message => "message",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from reflog operations.
///
/// None of these are retried internally; they describe either persisted
/// data that is wrong or a call that cannot succeed as made.
#[derive(Debug, Error)]
pub enum RefLogError {
    /// A persisted line is malformed.
    #[error("malformed reflog {field}{}: {detail}", .line.map(|l| format!(" on line {l}")).unwrap_or_default())]
    Format {
        /// Which field failed to decode
        field: Field,
        /// 1-based line number, when decoding from a source
        line: Option<usize>,
        /// What was wrong with it
        detail: String,
    },

    /// The log has no path to write to.
    #[error("reflog is not bound to a path; use to_file() first")]
    Unbound,

    /// Positional access past either end of the log.
    #[error("reflog index {index} out of range for {available} entries")]
    IndexOutOfRange {
        /// The requested index, negative for tail addressing
        index: isize,
        /// How many entries were found
        available: usize,
    },

    /// No default identity could be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A value handed to a constructor is not representable in a log line.
    #[error("invalid reflog value: {0}")]
    InvalidValue(String),

    /// I/O error on the backing file.
    #[error("reflog i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl RefLogError {
    pub(crate) fn format(field: Field, detail: impl Into<String>) -> Self {
        RefLogError::Format {
            field,
            line: None,
            detail: detail.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RefLogError::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach a line number to a format error.
    pub(crate) fn at_line(self, number: usize) -> Self {
        match self {
            RefLogError::Format { field, detail, .. } => RefLogError::Format {
                field,
                line: Some(number),
                detail,
            },
            other => other,
        }
    }

    /// The failing field, if this is a format error.
    pub fn field(&self) -> Option<Field> {
        match self {
            RefLogError::Format { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl From<TypeError> for RefLogError {
    fn from(err: TypeError) -> Self {
        RefLogError::InvalidValue(err.to_string())
    }
}

impl From<std::convert::Infallible> for RefLogError {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}
