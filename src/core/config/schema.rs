//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same file format is used for the global (user scope) file and the
//! repository file; values in the repository file win.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the configured identity must be a valid actor).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::actor::Actor;

/// Contents of one configuration file.
///
/// # Example
///
/// ```toml
/// [user]
/// name = "Jane Doe"
/// email = "jane@example.com"
///
/// [read]
/// window = 8192
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Identity used when appending without an explicit actor
    pub user: Option<UserConfig>,

    /// Reader tuning
    pub read: Option<ReadConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(user) = &self.user {
            user.validate()?;
        }
        if let Some(read) = &self.read {
            read.validate()?;
        }
        Ok(())
    }
}

/// `[user]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    /// Display name
    pub name: Option<String>,

    /// Email address, without angle brackets
    pub email: Option<String>,
}

impl UserConfig {
    /// Both halves must be usable in an actor line.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.name.as_deref().unwrap_or_default();
        let email = self.email.as_deref().unwrap_or_default();
        Actor::new(name, email)
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidValue(format!("invalid [user] identity: {e}")))
    }
}

/// `[read]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReadConfig {
    /// Initial size in bytes of the backward window used for negative indices
    pub window: Option<usize>,
}

impl ReadConfig {
    /// The window must be non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window == Some(0) {
            return Err(ConfigError::InvalidValue(
                "read.window must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
