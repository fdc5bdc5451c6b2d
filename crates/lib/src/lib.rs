//!
//! Rankboard: stable manual ordering for board-style collections.
//! This library provides the ordering-key engine and the coordination logic used to keep
//! drag-and-drop orderings (issues within a status column) consistent.
//!
//! ## Core Concepts
//!
//! * **Rank keys (`rank::RankKey`)**: Opaque, totally ordered strings. A new key can always be
//!   generated strictly between two existing keys, so reordering touches a single item.
//! * **Rank engine (`rank::RankEngine`)**: Pure functions producing keys before, after or between
//!   neighbors, and spreading fresh evenly spaced keys during a rebalance.
//! * **Order stores (`store::OrderStore`)**: The storage collaborator. It persists keys and
//!   returns collections sorted by key, but never computes keys itself.
//! * **Reorder coordinator (`coordinator::ReorderCoordinator`)**: Resolves a move request into a
//!   single key assignment, reports when a collection has become crowded, and performs the bulk
//!   rebalance with optimistic staleness detection.
//! * **Rebalance worker (`coordinator::RebalanceWorker`)**: Background task that rebalances crowded
//!   collections off the request path.

pub mod config;
pub mod constants;
pub mod coordinator;
pub mod rank;
pub mod store;

pub use config::{RankConfig, RetryPolicy, WorkerConfig};
pub use coordinator::{MoveOutcome, RankAssignment, ReorderCoordinator};
pub use rank::{Alphabet, RankEngine, RankKey, Ranker};
pub use store::{CollectionId, ItemId, OrderStore};

/// Result type used throughout the Rankboard library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Rankboard library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured key generation errors from the rank module
    #[error(transparent)]
    Rank(rank::RankError),

    /// Structured storage errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured coordination errors from the coordinator module
    #[error(transparent)]
    Coordinator(coordinator::CoordinatorError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Rank(_) => "rank",
            Error::Store(_) => "store",
            Error::Coordinator(_) => "coordinator",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            Error::Coordinator(coord_err) => coord_err.is_item_not_in_collection(),
            _ => false,
        }
    }

    /// Check if this error indicates a concurrent modification.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_conflict(),
            Error::Coordinator(coord_err) => coord_err.is_rebalance_conflict(),
            _ => false,
        }
    }

    /// Check if repeating the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }

    /// Check if `between` was called with neighbors out of order.
    pub fn is_invalid_ordering(&self) -> bool {
        match self {
            Error::Rank(rank_err) => rank_err.is_invalid_ordering(),
            _ => false,
        }
    }

    /// Check if a rank key is malformed for the alphabet in use.
    pub fn is_invalid_key(&self) -> bool {
        match self {
            Error::Rank(rank_err) => rank_err.is_invalid_key(),
            _ => false,
        }
    }

    /// Check if the key space has no room left where a key was requested.
    pub fn is_exhausted_key_space(&self) -> bool {
        match self {
            Error::Rank(rank_err) => rank_err.is_exhausted(),
            _ => false,
        }
    }

    /// Check if this error is configuration-related.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::Rank(rank_err) => rank_err.is_configuration_error(),
            _ => false,
        }
    }

    /// Check if the moved item could not be located in its target context.
    pub fn is_item_not_in_collection(&self) -> bool {
        match self {
            Error::Coordinator(coord_err) => coord_err.is_item_not_in_collection(),
            _ => false,
        }
    }

    /// Check if a rebalance lost a race with another writer.
    pub fn is_rebalance_conflict(&self) -> bool {
        match self {
            Error::Coordinator(coord_err) => coord_err.is_rebalance_conflict(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Store(store_err) => store_err.is_persistence_error(),
            _ => false,
        }
    }
}
