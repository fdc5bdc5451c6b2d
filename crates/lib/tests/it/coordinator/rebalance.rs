use std::sync::Arc;

use rankboard::{OrderStore, RankConfig, ReorderCoordinator, store::InMemoryStore};

use crate::helpers::*;

/// Inserts new items right after `anchor` until a placement asks for a rebalance.
async fn crowd_after(coordinator: &ReorderCoordinator, anchor: &str, limit: usize) -> usize {
    for n in 0..limit {
        let item = id(&format!("CROWD-{n}"));
        let outcome = coordinator
            .insert_item(&item, &todo(), Some(&id(anchor)), None)
            .await
            .unwrap();
        if outcome.needs_rebalance {
            return n + 1;
        }
    }
    panic!("no rebalance requested after {limit} inserts");
}

fn tight_config() -> RankConfig {
    RankConfig {
        rebalance_threshold: 3,
        ..radix11_config()
    }
}

#[tokio::test]
async fn test_crowded_gap_requests_rebalance() {
    let (store, _) = scenario_board().await;
    let coordinator = ReorderCoordinator::new(store.clone(), tight_config()).unwrap();

    let inserted = crowd_after(&coordinator, "A", 50).await;
    assert!(inserted > 1);
    assert!(coordinator.rebalance_queue().contains(&todo()));
    // The long key was still written; rebalancing is never inline
    assert_eq!(store.item_count().await, 4 + inserted);
    assert_strictly_ordered(&*store, &todo()).await;
}

#[tokio::test]
async fn test_rebalance_preserves_order_and_shortens_keys() {
    let (store, _) = scenario_board().await;
    let coordinator = ReorderCoordinator::new(store.clone(), tight_config()).unwrap();
    crowd_after(&coordinator, "C", 50).await;

    let before = order_of(&*store, &todo()).await;
    let mapping = coordinator.rebalance(&todo()).await.unwrap();

    assert_eq!(mapping.len(), before.len());
    assert_eq!(order_of(&*store, &todo()).await, before);
    assert_strictly_ordered(&*store, &todo()).await;

    let snapshot = store.fetch_ordered(&todo()).await.unwrap();
    for item in &snapshot.items {
        assert!(!coordinator.engine().needs_rebalance(&item.key, 3));
        assert_eq!(mapping[&item.id], item.key);
    }
    assert!(coordinator.rebalance_queue().is_empty());

    // There is room again everywhere
    let outcome = coordinator
        .insert_item(&id("NEW"), &todo(), Some(&id("C")), None)
        .await
        .unwrap();
    assert!(!outcome.needs_rebalance);
}

#[tokio::test]
async fn test_rebalance_leaves_other_collections_alone() {
    let (store, coordinator) = scenario_board().await;
    store.insert("X", &done(), "3A").await.unwrap();
    let done_before = store.fetch_ordered(&done()).await.unwrap();

    coordinator.rebalance(&todo()).await.unwrap();
    assert_eq!(store.fetch_ordered(&done()).await.unwrap(), done_before);
}

#[tokio::test]
async fn test_rebalance_conflict_is_reported() {
    let (inner, _) = scenario_board().await;
    let store = Arc::new(InterferingStore::new(inner.clone(), usize::MAX));
    let coordinator = ReorderCoordinator::new(store.clone(), radix11_config()).unwrap();

    let err = coordinator.rebalance(&todo()).await.unwrap_err();
    assert!(err.is_rebalance_conflict());
    assert!(err.is_retryable());
    assert_eq!(
        inner.resolve_item(&id("C")).await.unwrap().unwrap().key,
        "3A"
    );

    let err = coordinator.rebalance_with_retry(&todo()).await.unwrap_err();
    assert!(err.is_rebalance_conflict());
    // One failed attempt above, then the configured number of attempts
    assert_eq!(store.bulk_calls(), 1 + radix11_config().retry.max_attempts as usize);
}

#[tokio::test]
async fn test_rebalance_retry_wins_eventually() {
    let (inner, _) = scenario_board().await;
    let store = Arc::new(InterferingStore::new(inner.clone(), 3));
    let coordinator = ReorderCoordinator::new(store.clone(), radix11_config()).unwrap();
    coordinator.rebalance_queue().schedule(todo());

    let mapping = coordinator.rebalance_with_retry(&todo()).await.unwrap();
    assert_eq!(mapping.len(), 4);
    assert_eq!(store.bulk_calls(), 4);
    assert_eq!(order_of(&*inner, &todo()).await, ["A", "B", "C", "D"]);
    assert!(coordinator.rebalance_queue().is_empty());
}

#[tokio::test]
async fn test_rebalance_repairs_duplicate_keys() {
    // Concurrent drops into the same gap can leave equal keys behind
    let store = Arc::new(InMemoryStore::new());
    for (item, key) in [("A", "1"), ("B", "2"), ("C", "2"), ("D", "3")] {
        store.insert(item, &todo(), key).await.unwrap();
    }
    let coordinator = ReorderCoordinator::new(store.clone(), radix11_config()).unwrap();

    coordinator.rebalance(&todo()).await.unwrap();
    assert_eq!(order_of(&*store, &todo()).await, ["A", "B", "C", "D"]);
    assert_strictly_ordered(&*store, &todo()).await;
}
