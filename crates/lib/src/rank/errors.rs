//! Error types for rank key generation.

use thiserror::Error;

/// Errors raised by the key engines.
///
/// All of these are local, recoverable conditions. `InvalidOrdering` in
/// particular means a caller passed neighbors in the wrong order.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    /// `between` was asked for a key between `before >= after`.
    #[error("Invalid ordering: '{before}' does not sort before '{after}'")]
    InvalidOrdering { before: String, after: String },

    /// A key is not a canonical key over the engine's alphabet.
    #[error("Invalid rank key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// The alphabet cannot be used for rank keys.
    #[error("Invalid alphabet: {reason}")]
    InvalidAlphabet { reason: String },

    /// No representable key exists where one was requested.
    #[error("Key space exhausted: {reason}")]
    KeySpaceExhausted { reason: String },

    /// Engine configuration is out of range.
    #[error("Invalid rank configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl RankError {
    /// Check if this error is an ordering violation
    pub fn is_invalid_ordering(&self) -> bool {
        matches!(self, RankError::InvalidOrdering { .. })
    }

    /// Check if this error rejects a key's shape
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, RankError::InvalidKey { .. })
    }

    /// Check if this error is about configuration rather than data
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            RankError::InvalidAlphabet { .. } | RankError::InvalidConfig { .. }
        )
    }

    /// Check if the key space ran out of room; a rebalance fixes this
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RankError::KeySpaceExhausted { .. })
    }

    /// Get the offending key, if the error is about a single key
    pub fn key(&self) -> Option<&str> {
        match self {
            RankError::InvalidKey { key, .. } => Some(key),
            _ => None,
        }
    }
}

impl From<RankError> for crate::Error {
    fn from(err: RankError) -> Self {
        crate::Error::Rank(err)
    }
}
