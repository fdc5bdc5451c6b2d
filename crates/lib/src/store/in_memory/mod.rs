//! In-memory order store implementation
//!
//! This module provides an in-memory implementation of the OrderStore trait,
//! suitable for testing, development, or single-process tools that persist
//! the whole state to a JSON file.

mod persistence;

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{
    CollectionId, ItemId, ItemPlacement, OrderStore, OrderedSnapshot, RankedItem,
    errors::StoreError,
};
use crate::{Result, rank::RankKey};

/// Stored state of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredItem {
    pub(crate) collection: CollectionId,
    pub(crate) key: RankKey,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) items: BTreeMap<ItemId, StoredItem>,
    /// Per-collection revision, bumped on every change touching the collection.
    pub(crate) revisions: BTreeMap<CollectionId, u64>,
}

impl StoreState {
    fn bump(&mut self, collection: &CollectionId) {
        *self.revisions.entry(collection.clone()).or_insert(0) += 1;
    }

    fn revision(&self, collection: &CollectionId) -> u64 {
        self.revisions.get(collection).copied().unwrap_or(0)
    }

    fn members(&self, collection: &CollectionId) -> BTreeSet<&ItemId> {
        self.items
            .iter()
            .filter(|(_, stored)| &stored.collection == collection)
            .map(|(id, _)| id)
            .collect()
    }
}

/// A simple in-memory order store.
///
/// All state lives behind a single lock, so bulk writes are trivially atomic
/// and revisions are consistent with the items they describe.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub(crate) state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or moves an item. Same as [`OrderStore::write_key`].
    pub async fn insert(
        &self,
        item: impl Into<ItemId>,
        collection: &CollectionId,
        key: impl Into<RankKey>,
    ) -> Result<()> {
        self.write_key(&item.into(), collection, &key.into()).await
    }

    /// Deletes an item.
    ///
    /// # Returns
    /// * `Ok(true)` - If the item existed and was removed
    /// * `Ok(false)` - If no such item existed
    pub async fn remove(&self, item: &ItemId) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.items.remove(item) {
            Some(stored) => {
                state.bump(&stored.collection);
                tracing::debug!(item = %item, collection = %stored.collection, "Removed item");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Current revision of a collection; 0 for a collection never written.
    pub async fn revision(&self, collection: &CollectionId) -> u64 {
        self.state.read().await.revision(collection)
    }

    /// Total number of items across all collections.
    pub async fn item_count(&self) -> usize {
        self.state.read().await.items.len()
    }

    /// Every collection that currently holds at least one item.
    pub async fn collections(&self) -> Vec<CollectionId> {
        let state = self.state.read().await;
        let collections: BTreeSet<&CollectionId> =
            state.items.values().map(|stored| &stored.collection).collect();
        collections.into_iter().cloned().collect()
    }

    /// Saves the entire store to a JSON file.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads a store from a JSON file.
    ///
    /// If the file does not exist, a new, empty store is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn fetch_ordered(&self, collection: &CollectionId) -> Result<OrderedSnapshot> {
        let state = self.state.read().await;
        let mut items: Vec<RankedItem> = state
            .items
            .iter()
            .filter(|(_, stored)| &stored.collection == collection)
            .map(|(id, stored)| RankedItem {
                id: id.clone(),
                key: stored.key.clone(),
            })
            .collect();
        // Keys are unique in a healthy collection; the id only makes ties deterministic.
        items.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.id.cmp(&b.id)));

        Ok(OrderedSnapshot {
            collection: collection.clone(),
            revision: state.revision(collection),
            items,
        })
    }

    async fn write_key(
        &self,
        item: &ItemId,
        collection: &CollectionId,
        key: &RankKey,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let previous = state.items.insert(
            item.clone(),
            StoredItem {
                collection: collection.clone(),
                key: key.clone(),
                updated_at: Utc::now(),
            },
        );
        if let Some(previous) = previous
            && &previous.collection != collection
        {
            state.bump(&previous.collection);
        }
        state.bump(collection);
        Ok(())
    }

    async fn write_keys_bulk(
        &self,
        collection: &CollectionId,
        expected_revision: u64,
        keys: &BTreeMap<ItemId, RankKey>,
    ) -> Result<()> {
        let mut state = self.state.write().await;

        let actual = state.revision(collection);
        if actual != expected_revision {
            return Err(StoreError::RevisionMismatch {
                collection: collection.clone(),
                expected: expected_revision,
                actual,
            }
            .into());
        }

        let members = state.members(collection);
        if let Some(missing) = members.iter().find(|id| !keys.contains_key(**id)) {
            return Err(StoreError::MembershipMismatch {
                collection: collection.clone(),
                reason: format!("no key for member {missing}"),
            }
            .into());
        }
        if let Some(stranger) = keys.keys().find(|id| !members.contains(id)) {
            return Err(StoreError::MembershipMismatch {
                collection: collection.clone(),
                reason: format!("{stranger} is not a member"),
            }
            .into());
        }

        let now = Utc::now();
        for (id, key) in keys {
            if let Some(stored) = state.items.get_mut(id) {
                stored.key = key.clone();
                stored.updated_at = now;
            }
        }
        state.bump(collection);
        tracing::debug!(
            collection = %collection,
            count = keys.len(),
            revision = state.revision(collection),
            "Applied bulk key write"
        );
        Ok(())
    }

    async fn resolve_item(&self, item: &ItemId) -> Result<Option<ItemPlacement>> {
        let state = self.state.read().await;
        Ok(state.items.get(item).map(|stored| ItemPlacement {
            id: item.clone(),
            collection: stored.collection.clone(),
            key: stored.key.clone(),
        }))
    }
}
