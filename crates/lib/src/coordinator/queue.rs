//! Queue of collections waiting for a rebalance.
//!
//! Moves that produce long keys add their collection here instead of
//! rebalancing inline. The [`RebalanceWorker`](super::RebalanceWorker), or
//! any other caller, drains it off the request path.
//!
//! This is an in-memory queue; candidates are lost on restart. A lost
//! candidate is harmless because the next long key re-queues it.

use std::{collections::BTreeSet, sync::Mutex};

use crate::store::CollectionId;

/// Thread-safe, deduplicating set of rebalance candidates.
#[derive(Debug, Default)]
pub struct RebalanceQueue {
    pending: Mutex<BTreeSet<CollectionId>>,
}

impl RebalanceQueue {
    /// Create a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a collection as needing a rebalance.
    ///
    /// Returns true if it was not already queued.
    pub fn schedule(&self, collection: CollectionId) -> bool {
        self.pending.lock().unwrap().insert(collection)
    }

    /// Forget a collection, typically because it was just rebalanced.
    pub fn complete(&self, collection: &CollectionId) -> bool {
        self.pending.lock().unwrap().remove(collection)
    }

    /// Take every queued collection. The queue is emptied after this call.
    pub fn drain(&self) -> Vec<CollectionId> {
        let mut pending = self.pending.lock().unwrap();
        std::mem::take(&mut *pending).into_iter().collect()
    }

    pub fn contains(&self, collection: &CollectionId) -> bool {
        self.pending.lock().unwrap().contains(collection)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}
