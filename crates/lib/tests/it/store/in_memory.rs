use std::collections::BTreeMap;

use rankboard::{CollectionId, OrderStore, RankKey, store::InMemoryStore};

use crate::helpers::*;

#[tokio::test]
async fn test_fetch_sorts_by_key_not_insertion_order() {
    let store = seeded_store(&todo(), &[("C", "3A"), ("A", "1"), ("D", "5"), ("B", "3")]).await;
    assert_eq!(order_of(&*store, &todo()).await, ["A", "B", "C", "D"]);
    assert!(store.fetch_ordered(&done()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_collections_are_scoped_by_project() {
    let store = seeded_store(&todo(), &[("A", "1")]).await;
    let web_todo = CollectionId::new("web", "todo");
    store.insert("W", &web_todo, "1").await.unwrap();

    assert_eq!(order_of(&*store, &todo()).await, ["A"]);
    assert_eq!(order_of(&*store, &web_todo).await, ["W"]);
    assert_eq!(store.collections().await, vec![todo(), web_todo]);
}

#[tokio::test]
async fn test_resolve_item() {
    let store = seeded_store(&todo(), &[("A", "1")]).await;
    let placement = store.resolve_item(&id("A")).await.unwrap().unwrap();
    assert_eq!(placement.collection, todo());
    assert_eq!(placement.key, "1");
    assert!(store.resolve_item(&id("Z")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_every_change_bumps_revision() {
    let store = InMemoryStore::new();
    assert_eq!(store.revision(&todo()).await, 0);

    store.insert("A", &todo(), "1").await.unwrap();
    let after_insert = store.revision(&todo()).await;
    assert!(after_insert > 0);

    // Rewriting the same key still counts as a change
    store.insert("A", &todo(), "1").await.unwrap();
    assert!(store.revision(&todo()).await > after_insert);

    let todo_before = store.revision(&todo()).await;
    store.insert("A", &done(), "5").await.unwrap();
    assert!(store.revision(&todo()).await > todo_before);
    assert!(store.revision(&done()).await > 0);

    let done_before = store.revision(&done()).await;
    assert!(store.remove(&id("A")).await.unwrap());
    assert!(!store.remove(&id("A")).await.unwrap());
    assert!(store.revision(&done()).await > done_before);
    assert_eq!(store.item_count().await, 0);
}

#[tokio::test]
async fn test_bulk_write_is_all_or_nothing() {
    let store = seeded_store(&todo(), &[("A", "1"), ("B", "3")]).await;
    let snapshot = store.fetch_ordered(&todo()).await.unwrap();

    let stale = BTreeMap::from([(id("A"), RankKey::new("4")), (id("B"), RankKey::new("8"))]);
    let err = store
        .write_keys_bulk(&todo(), snapshot.revision + 1, &stale)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let partial = BTreeMap::from([(id("A"), RankKey::new("4"))]);
    let err = store
        .write_keys_bulk(&todo(), snapshot.revision, &partial)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let stranger = BTreeMap::from([
        (id("A"), RankKey::new("4")),
        (id("B"), RankKey::new("8")),
        (id("X"), RankKey::new("9")),
    ]);
    assert!(
        store
            .write_keys_bulk(&todo(), snapshot.revision, &stranger)
            .await
            .is_err()
    );

    // Nothing above was applied
    assert_eq!(store.fetch_ordered(&todo()).await.unwrap(), snapshot);

    // Reversing the order in one write
    let reversed = BTreeMap::from([(id("A"), RankKey::new("8")), (id("B"), RankKey::new("4"))]);
    store
        .write_keys_bulk(&todo(), snapshot.revision, &reversed)
        .await
        .unwrap();
    assert_eq!(order_of(&*store, &todo()).await, ["B", "A"]);
    assert!(store.revision(&todo()).await > snapshot.revision);
}

#[tokio::test]
async fn test_equal_keys_tie_break_by_id() {
    let store = seeded_store(&todo(), &[("B", "5"), ("A", "5")]).await;
    assert_eq!(order_of(&*store, &todo()).await, ["A", "B"]);
}
