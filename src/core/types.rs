//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (20-byte SHA-1 digest)
//! - [`RefName`] - Validated Git reference name
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use reflog::core::types::{Oid, RefName};
//!
//! let oid = Oid::from_hex("abc123def4567890abc123def4567890abc12345").unwrap();
//! let refname = RefName::new("refs/heads/main").unwrap();
//!
//! assert!(Oid::from_hex("not-a-sha").is_err());
//! assert!(RefName::new("invalid..name").is_err());
//! # let _ = (oid, refname);
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("invalid actor: {0}")]
    InvalidActor(String),
}

/// A Git object identifier.
///
/// Stored as the raw 20-byte digest. The textual form is always 40
/// lowercase hex characters.
///
/// # Example
///
/// ```
/// use reflog::core::types::Oid;
///
/// // Uppercase input is accepted, output is lowercase
/// let oid = Oid::from_hex("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.to_hex(), "abc123def4567890abc123def4567890abc12345");
///
/// // Get abbreviated form
/// assert_eq!(oid.short(7), "abc123d");
///
/// // Zero OID for null references
/// assert!(Oid::zero().is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid([u8; Oid::LEN]);

impl Oid {
    /// Length of the binary digest in bytes.
    pub const LEN: usize = 20;

    /// Length of the hex form in characters.
    pub const HEX_LEN: usize = 40;

    /// The zero/null OID.
    ///
    /// Marks a ref that did not exist before an update, or one being deleted.
    pub const fn zero() -> Self {
        Self([0; Self::LEN])
    }

    /// Check if this is the zero/null OID.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Decode a 40-character hex string.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the length is not 40 or a
    /// character is not a hex digit.
    pub fn from_hex(hex: impl AsRef<[u8]>) -> Result<Self, TypeError> {
        let hex = hex.as_ref();
        if hex.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidOid(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                hex.len()
            )));
        }
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(hex, &mut bytes)
            .map_err(|e| TypeError::InvalidOid(format!("object id must be hexadecimal: {e}")))?;
        Ok(Self(bytes))
    }

    /// Build an OID from a raw digest.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` unless `bytes` is exactly 20 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let digest: [u8; Self::LEN] = bytes.try_into().map_err(|_| {
            TypeError::InvalidOid(format!(
                "expected {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(digest))
    }

    /// Lowercase hex encoding of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the raw digest.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Get an abbreviated hex form of the OID.
    ///
    /// Returns the first `len` characters, or the full hex form if `len`
    /// exceeds it.
    pub fn short(&self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len.min(Self::HEX_LEN));
        hex
    }
}

impl From<[u8; Oid::LEN]> for Oid {
    fn from(bytes: [u8; Oid::LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Oid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.to_hex()
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A validated Git reference name.
///
/// Accepts full names under `refs/` as well as root pseudo-refs such as
/// `HEAD` or `ORIG_HEAD`.
///
/// # Example
///
/// ```
/// use reflog::core::types::RefName;
///
/// let head = RefName::head();
/// assert!(head.is_per_worktree());
///
/// let main = RefName::new("refs/heads/main").unwrap();
/// assert!(!main.is_per_worktree());
/// assert_eq!(main.strip_prefix("refs/heads/"), Some("main"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// The `HEAD` symbolic ref.
    pub fn head() -> Self {
        Self("HEAD".to_string())
    }

    /// Resolve a short name the way users type it.
    ///
    /// `HEAD`-like names and anything under `refs/` pass through; other
    /// names are treated as local branches (`main` -> `refs/heads/main`).
    pub fn from_short(name: &str) -> Result<Self, TypeError> {
        if name.starts_with("refs/") || Self::is_root_pseudo_ref(name) {
            Self::new(name)
        } else {
            Self::new(format!("refs/heads/{name}"))
        }
    }

    /// Strip a prefix from the ref name and return the remainder.
    ///
    /// Returns `None` if the ref doesn't start with the given prefix.
    pub fn strip_prefix(&self, prefix: &str) -> Option<&str> {
        self.0.strip_prefix(prefix)
    }

    /// Check if this ref is a branch ref.
    pub fn is_branch_ref(&self) -> bool {
        self.0.starts_with("refs/heads/")
    }

    /// Check if this ref is private to a single worktree.
    ///
    /// Root pseudo-refs and the `refs/bisect/`, `refs/worktree/` and
    /// `refs/rewritten/` namespaces are not shared between worktrees, so
    /// their logs live under the worktree's own git directory.
    pub fn is_per_worktree(&self) -> bool {
        const PER_WORKTREE: [&str; 3] = ["refs/bisect/", "refs/worktree/", "refs/rewritten/"];
        !self.0.starts_with("refs/") || PER_WORKTREE.iter().any(|p| self.0.starts_with(p))
    }

    /// `HEAD`, `ORIG_HEAD`, `FETCH_HEAD` and friends.
    fn is_root_pseudo_ref(name: &str) -> bool {
        !name.is_empty()
            && name.ends_with("HEAD")
            && name.chars().all(|c| c.is_ascii_uppercase() || c == '_')
    }

    /// Validate a ref name against Git's refname rules.
    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidRefName("ref name cannot be empty".into()));
        }

        if !name.starts_with("refs/") && !Self::is_root_pseudo_ref(name) {
            return Err(TypeError::InvalidRefName(format!(
                "'{name}' is neither under refs/ nor a pseudo-ref"
            )));
        }

        if name.ends_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '/'".into(),
            ));
        }
        if name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '.lock'".into(),
            ));
        }

        if name.contains("..") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '..'".into(),
            ));
        }
        if name.contains("@{") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '@{'".into(),
            ));
        }
        if name.contains("//") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '//'".into(),
            ));
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{c}'"
                )));
            }
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain control characters".into(),
            ));
        }

        for component in name.split('/') {
            if component.starts_with('.') {
                return Err(TypeError::InvalidRefName(
                    "path component cannot start with '.'".into(),
                ));
            }
            if component.ends_with(".lock") {
                return Err(TypeError::InvalidRefName(
                    "path component cannot end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod oid {
        use super::*;

        const SHA: &str = "abc123def4567890abc123def4567890abc12345";

        #[test]
        fn hex_roundtrip() {
            let oid = Oid::from_hex(SHA).unwrap();
            assert_eq!(oid.to_hex(), SHA);
            assert_eq!(oid.to_string(), SHA);
        }

        #[test]
        fn normalizes_to_lowercase() {
            let oid = Oid::from_hex(SHA.to_uppercase()).unwrap();
            assert_eq!(oid.to_hex(), SHA);
        }

        #[test]
        fn zero_oid() {
            let zero = Oid::zero();
            assert!(zero.is_zero());
            assert_eq!(zero.to_hex(), "0".repeat(40));
            assert_eq!(Oid::from_hex("0".repeat(40)).unwrap(), zero);
        }

        #[test]
        fn non_zero_is_not_zero() {
            assert!(!Oid::from_hex(SHA).unwrap().is_zero());
        }

        #[test]
        fn short_form() {
            let oid = Oid::from_hex(SHA).unwrap();
            assert_eq!(oid.short(7), "abc123d");
            assert_eq!(oid.short(100), SHA);
        }

        #[test]
        fn invalid_length() {
            assert!(matches!(
                Oid::from_hex("abc123"),
                Err(TypeError::InvalidOid(_))
            ));
            assert!(Oid::from_hex("a".repeat(64)).is_err());
        }

        #[test]
        fn non_hex_rejected() {
            let bad = format!("{}g", &SHA[..39]);
            assert!(matches!(Oid::from_hex(bad), Err(TypeError::InvalidOid(_))));
        }

        #[test]
        fn from_bytes_checks_length() {
            let bytes = [0xffu8; 20];
            assert_eq!(Oid::from_bytes(&bytes).unwrap().to_hex(), "f".repeat(40));
            assert!(Oid::from_bytes(&bytes[..19]).is_err());
        }

        #[test]
        fn serde_roundtrip() {
            let oid = Oid::from_hex(SHA).unwrap();
            let json = serde_json::to_string(&oid).unwrap();
            assert_eq!(json, format!("\"{SHA}\""));
            let parsed: Oid = serde_json::from_str(&json).unwrap();
            assert_eq!(oid, parsed);
        }
    }

    mod ref_name {
        use super::*;

        #[test]
        fn valid_refs() {
            assert!(RefName::new("refs/heads/main").is_ok());
            assert!(RefName::new("refs/remotes/origin/feature/x").is_ok());
            assert!(RefName::new("HEAD").is_ok());
            assert!(RefName::new("ORIG_HEAD").is_ok());
        }

        #[test]
        fn bare_names_rejected() {
            assert!(RefName::new("main").is_err());
            assert!(RefName::new("head").is_err());
        }

        #[test]
        fn from_short_expands_branches() {
            assert_eq!(
                RefName::from_short("main").unwrap().as_str(),
                "refs/heads/main"
            );
            assert_eq!(RefName::from_short("HEAD").unwrap(), RefName::head());
            assert_eq!(
                RefName::from_short("refs/tags/v1").unwrap().as_str(),
                "refs/tags/v1"
            );
        }

        #[test]
        fn per_worktree_refs() {
            assert!(RefName::head().is_per_worktree());
            assert!(RefName::new("refs/bisect/bad").unwrap().is_per_worktree());
            assert!(!RefName::new("refs/heads/main").unwrap().is_per_worktree());
        }

        #[test]
        fn invalid_refs_rejected() {
            assert!(RefName::new("").is_err());
            assert!(RefName::new("refs/heads/").is_err());
            assert!(RefName::new("refs/heads/x.lock").is_err());
            assert!(RefName::new("refs/heads/a..b").is_err());
            assert!(RefName::new("refs//heads").is_err());
            assert!(RefName::new("refs/heads/.hidden").is_err());
            assert!(RefName::new("refs/heads/has space").is_err());
        }

        #[test]
        fn serde_roundtrip() {
            let refname = RefName::new("refs/heads/main").unwrap();
            let json = serde_json::to_string(&refname).unwrap();
            let parsed: RefName = serde_json::from_str(&json).unwrap();
            assert_eq!(refname, parsed);
        }
    }
}
