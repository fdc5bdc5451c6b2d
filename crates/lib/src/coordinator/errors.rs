//! Error types for reorder coordination.

use thiserror::Error;

use crate::store::{CollectionId, ItemId};

/// Errors raised while turning move requests into key assignments.
///
/// Missing neighbor ids are deliberately not represented here: a stale
/// neighbor falls back to a one-sided placement instead of failing.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The item being moved cannot be located in the target's context.
    #[error("Item {item} cannot be placed in {collection}: {reason}")]
    ItemNotInCollection {
        item: ItemId,
        collection: CollectionId,
        reason: String,
    },

    /// The collection changed between reading it and writing the rebalanced keys.
    #[error("Rebalance of {collection} conflicted with a concurrent change: {reason}")]
    RebalanceConflict {
        collection: CollectionId,
        reason: String,
    },

    /// The background rebalance worker is not running.
    #[error("Rebalance worker unavailable: {reason}")]
    WorkerUnavailable { reason: String },
}

impl CoordinatorError {
    pub fn is_item_not_in_collection(&self) -> bool {
        matches!(self, CoordinatorError::ItemNotInCollection { .. })
    }

    pub fn is_rebalance_conflict(&self) -> bool {
        matches!(self, CoordinatorError::RebalanceConflict { .. })
    }

    pub fn is_worker_unavailable(&self) -> bool {
        matches!(self, CoordinatorError::WorkerUnavailable { .. })
    }

    /// Get the collection associated with this error, if any
    pub fn collection(&self) -> Option<&CollectionId> {
        match self {
            CoordinatorError::ItemNotInCollection { collection, .. }
            | CoordinatorError::RebalanceConflict { collection, .. } => Some(collection),
            CoordinatorError::WorkerUnavailable { .. } => None,
        }
    }
}

impl From<CoordinatorError> for crate::Error {
    fn from(err: CoordinatorError) -> Self {
        crate::Error::Coordinator(err)
    }
}
