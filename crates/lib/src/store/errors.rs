//! Error types for order store operations.

use thiserror::Error;

use super::{CollectionId, ItemId};

/// Errors that can occur while reading or writing rank keys.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Item not found by ID.
    #[error("Item not found: {item}")]
    ItemNotFound {
        /// The ID of the item that was not found
        item: ItemId,
    },

    /// The collection changed since the caller's snapshot was taken.
    #[error("Collection {collection} is at revision {actual}, expected {expected}")]
    RevisionMismatch {
        /// The collection being written
        collection: CollectionId,
        /// Revision the caller read
        expected: u64,
        /// Revision found at write time
        actual: u64,
    },

    /// A bulk write does not cover exactly the collection's current members.
    #[error("Bulk write for {collection} does not match its members: {reason}")]
    MembershipMismatch {
        /// The collection being written
        collection: CollectionId,
        /// What differed
        reason: String,
    },

    /// Saving or loading persisted state failed.
    #[error("Persistence failed for {path}")]
    Persistence {
        /// File involved
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Persisted state could not be decoded.
    #[error("Persisted state is invalid: {reason}")]
    InvalidState {
        /// Description of the problem
        reason: String,
    },
}

impl StoreError {
    /// Check if this error indicates a resource was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::ItemNotFound { .. })
    }

    /// Check if this error indicates the caller's view of a collection was stale
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::RevisionMismatch { .. } | StoreError::MembershipMismatch { .. }
        )
    }

    /// Check if this error came from file persistence
    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            StoreError::Persistence { .. } | StoreError::InvalidState { .. }
        )
    }

    /// Get the collection associated with this error, if any
    pub fn collection(&self) -> Option<&CollectionId> {
        match self {
            StoreError::RevisionMismatch { collection, .. }
            | StoreError::MembershipMismatch { collection, .. } => Some(collection),
            _ => None,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
