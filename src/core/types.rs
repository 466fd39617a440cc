//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (content hash)
//! - [`ObjectKind`] - The four kinds of object stored in the ODB
//! - [`RepositoryId`] - In-process identity of one repository handle
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so nothing past the public surface ever has to
//! re-check an object id.
//!
//! # Examples
//!
//! ```
//! use gitteh::core::types::Oid;
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert_eq!(oid.short(7), "abc123d");
//!
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors from type validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase so that two spellings of the same hash
/// hit the same identity-cache slot.
///
/// # Example
///
/// ```
/// use gitteh::core::types::Oid;
///
/// // Create from hex string (normalized to lowercase)
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
///
/// // Get abbreviated form
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Validate an object id.
    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Oid {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl std::str::FromStr for Oid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of an object in the object database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectKind {
    /// The name git uses for this kind in object headers.
    ///
    /// # Example
    ///
    /// ```
    /// use gitteh::core::types::ObjectKind;
    ///
    /// assert_eq!(ObjectKind::Commit.as_str(), "commit");
    /// assert_eq!(ObjectKind::Blob.to_string(), "blob");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Commit => "commit",
            ObjectKind::Tree => "tree",
            ObjectKind::Blob => "blob",
            ObjectKind::Tag => "tag",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one live repository handle.
///
/// Every successful open or init mints a fresh id, so opening the same
/// directory twice yields two distinct ids (and two independent caches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepositoryId(Uuid);

impl RepositoryId {
    /// Mint a new, never-before-seen id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RepositoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short form is plenty for log lines.
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod oid {
        use super::*;

        #[test]
        fn valid_sha1() {
            assert!(Oid::new("abc123def4567890abc123def4567890abc12345").is_ok());
        }

        #[test]
        fn valid_sha256() {
            let sha256 = "abc123def4567890abc123def4567890abc123def4567890abc123def456789a";
            assert_eq!(sha256.len(), 64);
            assert!(Oid::new(sha256).is_ok());
        }

        #[test]
        fn normalizes_to_lowercase() {
            let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
            assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
        }

        #[test]
        fn mixed_case_spellings_are_equal() {
            let a = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
            let b: Oid = "abc123def4567890abc123def4567890abc12345".parse().unwrap();
            assert_eq!(a, b);
        }

        #[test]
        fn serde_roundtrip() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            let json = serde_json::to_string(&oid).unwrap();
            assert_eq!(json, "\"abc123def4567890abc123def4567890abc12345\"");
            let parsed: Oid = serde_json::from_str(&json).unwrap();
            assert_eq!(oid, parsed);
        }

        #[test]
        fn serde_normalizes_and_validates() {
            let parsed: Oid =
                serde_json::from_str("\"ABC123DEF4567890ABC123DEF4567890ABC12345\"").unwrap();
            assert_eq!(parsed.as_str(), "abc123def4567890abc123def4567890abc12345");
            assert!(serde_json::from_str::<Oid>("\"not-a-sha\"").is_err());
        }

        #[test]
        fn short_form() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert_eq!(oid.short(7), "abc123d");
            assert_eq!(oid.short(100), oid.as_str());
        }

        #[test]
        fn invalid_length() {
            assert!(Oid::new("").is_err());
            assert!(Oid::new("tooshort").is_err());
        }

        #[test]
        fn non_hex_rejected() {
            assert!(matches!(
                Oid::new("xyz123def4567890abc123def4567890abc12345"),
                Err(TypeError::InvalidOid(_))
            ));
        }
    }

    mod object_kind {
        use super::*;

        #[test]
        fn display_matches_header_names() {
            assert_eq!(ObjectKind::Commit.to_string(), "commit");
            assert_eq!(ObjectKind::Tree.to_string(), "tree");
            assert_eq!(ObjectKind::Blob.to_string(), "blob");
            assert_eq!(ObjectKind::Tag.to_string(), "tag");
        }
    }

    mod repository_id {
        use super::*;

        #[test]
        fn ids_are_unique() {
            assert_ne!(RepositoryId::new(), RepositoryId::new());
        }

        #[test]
        fn display_is_short() {
            assert_eq!(RepositoryId::new().to_string().len(), 8);
        }
    }
}
