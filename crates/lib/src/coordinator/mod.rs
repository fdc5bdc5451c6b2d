//! Reorder coordination.
//!
//! The [`ReorderCoordinator`] owns the rules for assigning rank keys to items
//! in a collection. It turns a UI-level move ("put X between A and B") into a
//! single key write, reports when a collection's keys have grown long enough
//! to deserve a rebalance, and performs that rebalance as one bulk write.
//!
//! Rebalancing never happens inline with a move. A move that produces a long
//! key completes normally, flags [`RankAssignment::needs_rebalance`] and puts
//! the collection on the [`RebalanceQueue`]; a [`RebalanceWorker`] or the
//! caller runs [`ReorderCoordinator::rebalance`] later.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::{
    Result,
    config::RankConfig,
    rank::{RankEngine, RankKey},
    store::{CollectionId, ItemId, OrderStore, OrderedSnapshot},
};

mod background;
pub mod errors;
mod queue;


pub use background::{RebalanceCommand, RebalanceHandle, RebalanceWorker};
pub use errors::CoordinatorError;
pub use queue::RebalanceQueue;

/// A computed key plus the rebalance hint for its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankAssignment {
    pub key: RankKey,
    /// The key is longer than the configured threshold; rebalance soon.
    pub needs_rebalance: bool,
}

/// The result of a persisted move or insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub item: ItemId,
    pub collection: CollectionId,
    pub key: RankKey,
    /// The collection was queued for a rebalance.
    pub needs_rebalance: bool,
}

/// Resolves move requests into rank keys and keeps collections dense.
pub struct ReorderCoordinator {
    store: Arc<dyn OrderStore>,
    engine: RankEngine,
    config: RankConfig,
    queue: Arc<RebalanceQueue>,
}

impl std::fmt::Debug for ReorderCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReorderCoordinator")
            .field("engine", &self.engine)
            .field("config", &self.config)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl ReorderCoordinator {
    /// Creates a coordinator over `store`.
    ///
    /// # Errors
    /// Returns a configuration error if `config` does not validate.
    pub fn new(store: Arc<dyn OrderStore>, config: RankConfig) -> Result<Self> {
        let engine = RankEngine::from_config(&config)?;
        Ok(Self {
            store,
            engine,
            config,
            queue: Arc::new(RebalanceQueue::new()),
        })
    }

    /// Shares an existing queue, e.g. one drained by a worker serving several coordinators.
    pub fn with_queue(mut self, queue: Arc<RebalanceQueue>) -> Self {
        self.queue = queue;
        self
    }

    pub fn engine(&self) -> &RankEngine {
        &self.engine
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    pub fn rebalance_queue(&self) -> &Arc<RebalanceQueue> {
        &self.queue
    }

    /// Computes a key for placing an item between two neighbors of `target`.
    ///
    /// Neighbor ids that do not resolve to a member of `target` are treated
    /// as absent. The key is always computed against adjacent members of the
    /// current snapshot, so it sorts strictly between its neighbors:
    ///
    /// * a resolved `before` neighbor pairs with its actual successor;
    /// * otherwise a resolved `after` neighbor pairs with its actual predecessor;
    /// * otherwise the item goes after the last member (or gets the initial
    ///   key in an empty collection).
    ///
    /// Nothing is written.
    pub async fn compute_move_key(
        &self,
        target: &CollectionId,
        before: Option<&ItemId>,
        after: Option<&ItemId>,
    ) -> Result<RankAssignment> {
        let snapshot = self.store.fetch_ordered(target).await?;
        self.key_in_snapshot(&snapshot, before, after)
    }

    /// Computes a key sorting after every member of `target`.
    pub async fn append_key(&self, target: &CollectionId) -> Result<RankAssignment> {
        let snapshot = self.store.fetch_ordered(target).await?;
        self.assign(snapshot.last().map(|item| &item.key), None, snapshot.len())
    }

    /// Computes a key sorting before every member of `target`.
    pub async fn prepend_key(&self, target: &CollectionId) -> Result<RankAssignment> {
        let snapshot = self.store.fetch_ordered(target).await?;
        self.assign(None, snapshot.first().map(|item| &item.key), snapshot.len())
    }

    /// Moves an existing item into `target` between two neighbors and persists its new key.
    ///
    /// The item's own current slot is ignored while computing the key, so
    /// moving within a column behaves like removing and re-inserting it.
    ///
    /// # Errors
    /// `CoordinatorError::ItemNotInCollection` if the item does not exist or
    /// belongs to a different project than `target`.
    pub async fn move_item(
        &self,
        item: &ItemId,
        target: &CollectionId,
        before: Option<&ItemId>,
        after: Option<&ItemId>,
    ) -> Result<MoveOutcome> {
        let not_placeable = |reason: String| CoordinatorError::ItemNotInCollection {
            item: item.clone(),
            collection: target.clone(),
            reason,
        };

        match self.store.resolve_item(item).await? {
            None => return Err(not_placeable("item does not exist".to_string()).into()),
            Some(placement) if !placement.collection.same_project(target) => {
                return Err(not_placeable(format!(
                    "item belongs to project '{}'",
                    placement.collection.project
                ))
                .into());
            }
            Some(_) => {}
        }

        self.place(item, target, before, after).await
    }

    /// Places a newly created item into `target` and persists its key.
    pub async fn insert_item(
        &self,
        item: &ItemId,
        target: &CollectionId,
        before: Option<&ItemId>,
        after: Option<&ItemId>,
    ) -> Result<MoveOutcome> {
        self.place(item, target, before, after).await
    }

    /// Assigns fresh, evenly spaced keys to every member of `collection`.
    ///
    /// The new keys preserve the current order exactly. The complete mapping
    /// is computed before anything is written, and it is written in one bulk
    /// call guarded by the snapshot's revision.
    ///
    /// # Errors
    /// `CoordinatorError::RebalanceConflict` if the collection changed since
    /// it was read. Nothing has been written then; retry the whole rebalance.
    pub async fn rebalance(&self, collection: &CollectionId) -> Result<BTreeMap<ItemId, RankKey>> {
        let snapshot = self.store.fetch_ordered(collection).await?;
        let keys = self.engine.spread(snapshot.len())?;
        if let Some(longest) = keys.iter().map(RankKey::len).max()
            && longest > self.config.rebalance_threshold
        {
            warn!(
                collection = %collection,
                items = snapshot.len(),
                key_len = longest,
                threshold = self.config.rebalance_threshold,
                "Rebalanced keys exceed the rebalance threshold"
            );
        }
        let mapping: BTreeMap<ItemId, RankKey> = snapshot
            .items
            .iter()
            .map(|item| item.id.clone())
            .zip(keys)
            .collect();

        if mapping.is_empty() {
            self.queue.complete(collection);
            return Ok(mapping);
        }

        match self
            .store
            .write_keys_bulk(collection, snapshot.revision, &mapping)
            .await
        {
            Ok(()) => {
                self.queue.complete(collection);
                info!(
                    collection = %collection,
                    items = mapping.len(),
                    revision = snapshot.revision,
                    "Rebalanced collection"
                );
                Ok(mapping)
            }
            Err(e) if e.is_conflict() => {
                warn!(collection = %collection, "Rebalance lost a race: {e}");
                Err(CoordinatorError::RebalanceConflict {
                    collection: collection.clone(),
                    reason: e.to_string(),
                }
                .into())
            }
            Err(e) => Err(e),
        }
    }

    /// [`rebalance`](Self::rebalance), retrying conflicts with exponential backoff.
    ///
    /// Gives up after `config.retry.max_attempts` attempts and returns the last
    /// conflict. Other errors are returned immediately.
    pub async fn rebalance_with_retry(
        &self,
        collection: &CollectionId,
    ) -> Result<BTreeMap<ItemId, RankKey>> {
        let policy = self.config.retry;
        let mut attempt = 1;
        loop {
            match self.rebalance(collection).await {
                Err(e) if e.is_rebalance_conflict() && attempt < policy.max_attempts => {
                    let delay = with_jitter(policy.delay(attempt));
                    debug!(
                        collection = %collection,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying rebalance"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn place(
        &self,
        item: &ItemId,
        target: &CollectionId,
        before: Option<&ItemId>,
        after: Option<&ItemId>,
    ) -> Result<MoveOutcome> {
        let snapshot = self.store.fetch_ordered(target).await?.without(item);
        let mut assignment = self.key_in_snapshot(
            &snapshot,
            before.filter(|id| *id != item),
            after.filter(|id| *id != item),
        )?;

        self.store.write_key(item, target, &assignment.key).await?;
        debug!(item = %item, collection = %target, key = %assignment.key, "Placed item");

        // A concurrent placement into the same gap computes the same key
        let collides = self
            .store
            .fetch_ordered(target)
            .await?
            .items
            .iter()
            .any(|other| other.key == assignment.key && other.id != *item);
        if collides {
            warn!(collection = %target, key = %assignment.key, "Placed key collides with another item");
            assignment.needs_rebalance = true;
        }

        if assignment.needs_rebalance && self.queue.schedule(target.clone()) {
            info!(
                collection = %target,
                key_len = assignment.key.len(),
                "Collection queued for rebalance"
            );
        }

        Ok(MoveOutcome {
            item: item.clone(),
            collection: target.clone(),
            key: assignment.key,
            needs_rebalance: assignment.needs_rebalance,
        })
    }

    fn key_in_snapshot(
        &self,
        snapshot: &OrderedSnapshot,
        before: Option<&ItemId>,
        after: Option<&ItemId>,
    ) -> Result<RankAssignment> {
        let before_index = before.and_then(|id| snapshot.position(id));
        let after_index = after.and_then(|id| snapshot.position(id));

        for (role, id, index) in [("before", before, before_index), ("after", after, after_index)] {
            if let Some(id) = id
                && index.is_none()
            {
                debug!(
                    collection = %snapshot.collection,
                    neighbor = %id,
                    role,
                    "Ignoring stale neighbor"
                );
            }
        }

        let (low, high) = match (before_index, after_index) {
            (Some(i), _) => {
                let successor = (i + 1 < snapshot.len()).then_some(i + 1);
                if after_index.is_some() && after_index != successor {
                    debug!(
                        collection = %snapshot.collection,
                        "Neighbors are no longer adjacent; placing after the before neighbor"
                    );
                }
                (Some(i), successor)
            }
            (None, Some(j)) => (j.checked_sub(1), Some(j)),
            (None, None) => (snapshot.len().checked_sub(1), None),
        };

        // Racing placements can leave equal keys behind. Widen the bracket
        // away from the neighbor the caller named until it is strict, and
        // queue the collection so the duplicates get separated.
        let mut duplicates = false;
        let (low, high) = match (low, high) {
            (Some(i), Some(j)) if snapshot.items[i].key == snapshot.items[j].key => {
                duplicates = true;
                let key = &snapshot.items[i].key;
                debug!(collection = %snapshot.collection, key = %key, "Skipping duplicate keys");
                if before_index.is_some() {
                    (Some(i), (j..snapshot.len()).find(|&k| snapshot.items[k].key != *key))
                } else {
                    ((0..=i).rev().find(|&k| snapshot.items[k].key != *key), Some(j))
                }
            }
            bracket => bracket,
        };

        let mut assignment = self.assign(
            low.map(|i| &snapshot.items[i].key),
            high.map(|i| &snapshot.items[i].key),
            snapshot.len(),
        )?;
        assignment.needs_rebalance |= duplicates;
        Ok(assignment)
    }

    /// A key is flagged only when it is longer than both the configured
    /// threshold and the keys a rebalance of `count + 1` items would assign.
    fn assign(
        &self,
        low: Option<&RankKey>,
        high: Option<&RankKey>,
        count: usize,
    ) -> Result<RankAssignment> {
        let key = self.engine.rank_between(low, high)?;
        let threshold = self
            .engine
            .spread_length(count + 1)
            .map_or(self.config.rebalance_threshold, |length| {
                length.max(self.config.rebalance_threshold)
            });
        let needs_rebalance = self.engine.needs_rebalance(&key, threshold);
        Ok(RankAssignment {
            key,
            needs_rebalance,
        })
    }
}

/// Adds up to 50% random jitter so racing rebalances spread out.
fn with_jitter(delay: Duration) -> Duration {
    let max_jitter = (delay.as_millis() as u64) / 2;
    if max_jitter == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter))
}
