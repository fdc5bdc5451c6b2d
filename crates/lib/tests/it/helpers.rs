use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use rankboard::{
    Alphabet, CollectionId, ItemId, OrderStore, RankConfig, RankKey, ReorderCoordinator, Result,
    RetryPolicy,
    store::{InMemoryStore, ItemPlacement, OrderedSnapshot},
};

// ==========================
// FIXTURES
// ==========================

/// Config over the 11-symbol alphabet "0123456789A", small enough to reason about by hand.
pub fn radix11_config() -> RankConfig {
    RankConfig {
        alphabet: Alphabet::new("0123456789A").unwrap(),
        retry: RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 1,
            max_delay_ms: 4,
        },
        ..RankConfig::default()
    }
}

pub fn todo() -> CollectionId {
    CollectionId::new("core", "todo")
}

pub fn done() -> CollectionId {
    CollectionId::new("core", "done")
}

pub fn id(s: &str) -> ItemId {
    ItemId::new(s)
}

/// Creates a store holding `items` (id, key) in `collection`.
pub async fn seeded_store(collection: &CollectionId, items: &[(&str, &str)]) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    for (item, key) in items {
        store.insert(*item, collection, *key).await.unwrap();
    }
    store
}

/// Column with keys ["1", "3", "3A", "5"] held by A, B, C, D.
pub async fn scenario_board() -> (Arc<InMemoryStore>, ReorderCoordinator) {
    let store = seeded_store(&todo(), &[("A", "1"), ("B", "3"), ("C", "3A"), ("D", "5")]).await;
    let coordinator = ReorderCoordinator::new(store.clone(), radix11_config()).unwrap();
    (store, coordinator)
}

/// Item ids of `collection` in key order.
pub async fn order_of(store: &dyn OrderStore, collection: &CollectionId) -> Vec<String> {
    store
        .fetch_ordered(collection)
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|item| item.id.as_str().to_string())
        .collect()
}

/// Asserts keys in `collection` are strictly ascending, hence pairwise distinct.
pub async fn assert_strictly_ordered(store: &dyn OrderStore, collection: &CollectionId) {
    let snapshot = store.fetch_ordered(collection).await.unwrap();
    for pair in snapshot.items.windows(2) {
        assert!(
            pair[0].key < pair[1].key,
            "keys out of order or duplicated in {collection}: {} ({}) then {} ({})",
            pair[0].id,
            pair[0].key,
            pair[1].id,
            pair[1].key
        );
    }
}

// ==========================
// STORE WRAPPERS
// ==========================

/// Wraps an [`InMemoryStore`] and rewrites one member right before each of
/// the first `interfere` bulk writes, simulating a concurrent edit that
/// lands between a rebalance's read and its write.
pub struct InterferingStore {
    pub inner: Arc<InMemoryStore>,
    interfere: usize,
    bulk_calls: AtomicUsize,
}

impl InterferingStore {
    pub fn new(inner: Arc<InMemoryStore>, interfere: usize) -> Self {
        Self {
            inner,
            interfere,
            bulk_calls: AtomicUsize::new(0),
        }
    }

    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderStore for InterferingStore {
    async fn fetch_ordered(&self, collection: &CollectionId) -> Result<OrderedSnapshot> {
        self.inner.fetch_ordered(collection).await
    }

    async fn write_key(
        &self,
        item: &ItemId,
        collection: &CollectionId,
        key: &RankKey,
    ) -> Result<()> {
        self.inner.write_key(item, collection, key).await
    }

    async fn write_keys_bulk(
        &self,
        collection: &CollectionId,
        expected_revision: u64,
        keys: &BTreeMap<ItemId, RankKey>,
    ) -> Result<()> {
        if self.bulk_calls.fetch_add(1, Ordering::SeqCst) < self.interfere {
            let snapshot = self.inner.fetch_ordered(collection).await?;
            if let Some(last) = snapshot.last() {
                self.inner.write_key(&last.id, collection, &last.key).await?;
            }
        }
        self.inner
            .write_keys_bulk(collection, expected_revision, keys)
            .await
    }

    async fn resolve_item(&self, item: &ItemId) -> Result<Option<ItemPlacement>> {
        self.inner.resolve_item(item).await
    }
}
