//! core::actor
//!
//! Identity attributed to a reflog entry.
//!
//! An actor serializes as `Name <email>`. Because `<` and `>` delimit the
//! email and every record is a single line, neither field may contain
//! those characters or a newline.
//!
//! # Example
//!
//! ```
//! use reflog::core::actor::Actor;
//!
//! let actor = Actor::parse("Jane Doe <jane@example.com>").unwrap();
//! assert_eq!(actor.name(), "Jane Doe");
//! assert_eq!(actor.email(), "jane@example.com");
//! assert_eq!(actor.to_string(), "Jane Doe <jane@example.com>");
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::config::{ConfigError, ConfigReader};
use super::types::TypeError;

/// Environment variables consulted for the name, highest precedence first.
const NAME_ENV: [&str; 2] = ["GIT_COMMITTER_NAME", "GIT_AUTHOR_NAME"];

/// Environment variables consulted for the email, before and after config.
const EMAIL_ENV: [&str; 2] = ["GIT_COMMITTER_EMAIL", "GIT_AUTHOR_EMAIL"];
const EMAIL_FALLBACK_ENV: &str = "EMAIL";

/// A name and email pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    name: String,
    email: String,
}

impl Actor {
    /// Create a validated actor.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidActor` if either field contains `<`, `>`
    /// or a newline.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        let email = email.into();
        Self::validate_field("name", &name)?;
        Self::validate_field("email", &email)?;
        Ok(Self { name, email })
    }

    /// Parse `Name <email>`.
    ///
    /// Exactly one space separates the name from `<`, and the text must end
    /// with `>`.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidActor` if the delimiter pair is missing
    /// or malformed.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        let inner = text
            .strip_suffix('>')
            .ok_or_else(|| TypeError::InvalidActor(format!("missing '>' in '{text}'")))?;
        let (name, email) = inner
            .split_once(" <")
            .ok_or_else(|| TypeError::InvalidActor(format!("missing ' <' in '{text}'")))?;
        Self::new(name, email)
    }

    /// Render as `Name <email>`.
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Resolve the default committer identity.
    ///
    /// The name comes from `GIT_COMMITTER_NAME`, `GIT_AUTHOR_NAME`, then
    /// `user.name`. The email comes from `GIT_COMMITTER_EMAIL`,
    /// `GIT_AUTHOR_EMAIL`, `user.email`, then `EMAIL`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingIdentity` if either half cannot be
    /// resolved, and `ConfigError::InvalidValue` if a resolved value is not
    /// a valid actor field.
    pub fn from_config(config: &dyn ConfigReader) -> Result<Self, ConfigError> {
        Self::resolve(&|key: &str| std::env::var(key).ok(), config)
    }

    pub(crate) fn resolve(
        env: &dyn Fn(&str) -> Option<String>,
        config: &dyn ConfigReader,
    ) -> Result<Self, ConfigError> {
        let lookup_env = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| env(k))
                .find(|v| !v.is_empty())
        };

        let name = lookup_env(&NAME_ENV[..])
            .or_else(|| config.get_value("user", "name"))
            .ok_or(ConfigError::MissingIdentity("user.name"))?;
        let email = lookup_env(&EMAIL_ENV[..])
            .or_else(|| config.get_value("user", "email"))
            .or_else(|| lookup_env(&[EMAIL_FALLBACK_ENV][..]))
            .ok_or(ConfigError::MissingIdentity("user.email"))?;

        Self::new(name, email).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The email address, without angle brackets.
    pub fn email(&self) -> &str {
        &self.email
    }

    fn validate_field(field: &str, value: &str) -> Result<(), TypeError> {
        if let Some(c) = value.chars().find(|c| matches!(c, '<' | '>' | '\n')) {
            return Err(TypeError::InvalidActor(format!(
                "{field} cannot contain {c:?}"
            )));
        }
        Ok(())
    }
}

impl FromStr for Actor {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Actor {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
