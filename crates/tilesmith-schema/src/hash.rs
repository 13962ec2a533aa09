//! Checksum newtype recorded in lock entries.

use serde::{Deserialize, Serialize};

/// Newtype for a SHA256 hash string (64 lowercase hex characters).
///
/// Lock entries written before a release was ever published carry no
/// checksum, so the empty string is a valid (unset) value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Sha256Hash(String);

impl Sha256Hash {
    /// Create a new `Sha256Hash` without validation (for deserialized data).
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Return the inner hex string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no checksum has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Sha256Hash {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Sha256Hash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
