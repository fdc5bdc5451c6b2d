//! The rank key value type.

use serde::{Deserialize, Serialize};

/// An opaque, totally ordered sort key for a manually ordered item.
///
/// Ordering is plain byte comparison of the underlying string. A `RankKey`
/// can be constructed from any string; whether it is a canonical key for a
/// given alphabet is checked by [`RankEngine::validate`](super::RankEngine::validate).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankKey(String);

impl RankKey {
    /// Creates a key from any string-like input without validation.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the key.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the key is empty. Empty keys are never valid.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for RankKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RankKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<RankKey> for String {
    fn from(key: RankKey) -> Self {
        key.0
    }
}

impl AsRef<str> for RankKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RankKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for RankKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RankKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<RankKey> for &str {
    fn eq(&self, other: &RankKey) -> bool {
        *self == other.0
    }
}
