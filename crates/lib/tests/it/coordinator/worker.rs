use std::{sync::Arc, time::Duration};

use rankboard::{RankConfig, ReorderCoordinator, coordinator::RebalanceWorker};

use crate::helpers::*;

fn worker_config(interval_ms: u64) -> RankConfig {
    let mut config = radix11_config();
    config.rebalance_threshold = 3;
    config.worker.interval_ms = interval_ms;
    config
}

async fn crowd(coordinator: &ReorderCoordinator) {
    for n in 0..50 {
        let outcome = coordinator
            .insert_item(&id(&format!("W-{n}")), &todo(), Some(&id("A")), None)
            .await
            .unwrap();
        if outcome.needs_rebalance {
            return;
        }
    }
    panic!("column never became crowded");
}

#[tokio::test]
async fn test_worker_flush_drains_queue() {
    let (store, _) = scenario_board().await;
    let coordinator = Arc::new(ReorderCoordinator::new(store.clone(), worker_config(60_000)).unwrap());
    let handle = RebalanceWorker::start(coordinator.clone());

    crowd(&coordinator).await;
    assert!(coordinator.rebalance_queue().contains(&todo()));
    let before = order_of(&*store, &todo()).await;

    assert_eq!(handle.flush().await.unwrap(), 1);
    assert!(coordinator.rebalance_queue().is_empty());
    assert_eq!(order_of(&*store, &todo()).await, before);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_worker_rebalances_on_its_own() {
    let (store, _) = scenario_board().await;
    let coordinator = Arc::new(ReorderCoordinator::new(store.clone(), worker_config(20)).unwrap());
    let handle = RebalanceWorker::start(coordinator.clone());

    crowd(&coordinator).await;

    let mut waited = Duration::ZERO;
    while !coordinator.rebalance_queue().is_empty() {
        assert!(waited < Duration::from_secs(5), "worker never drained the queue");
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += Duration::from_millis(10);
    }
    assert_strictly_ordered(&*store, &todo()).await;
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_worker_rebalance_now() {
    let (store, _) = scenario_board().await;
    let coordinator = Arc::new(ReorderCoordinator::new(store.clone(), worker_config(60_000)).unwrap());
    let handle = RebalanceWorker::start(coordinator);

    let mapping = handle.rebalance_now(todo()).await.unwrap();
    assert_eq!(mapping.len(), 4);
    assert_eq!(order_of(&*store, &todo()).await, ["A", "B", "C", "D"]);

    // Cloned handles talk to the same worker
    let other = handle.clone();
    assert_eq!(other.flush().await.unwrap(), 0);
    other.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_handle_reports_stopped_worker() {
    let (store, _) = scenario_board().await;
    let coordinator = Arc::new(ReorderCoordinator::new(store, worker_config(60_000)).unwrap());
    let handle = RebalanceWorker::start(coordinator);
    assert!(handle.is_running());

    handle.shutdown().await.unwrap();
    let err = handle.rebalance_now(todo()).await.unwrap_err();
    assert_eq!(err.module(), "coordinator");
}
