//! Background rebalance worker.
//!
//! This module provides the RebalanceWorker that drains the rebalance queue
//! on a timer, off the latency path of individual moves, and executes
//! on-demand commands sent through a [`RebalanceHandle`].

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, oneshot},
    time::interval,
};
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::{ReorderCoordinator, errors::CoordinatorError};
use crate::{
    Result,
    rank::RankKey,
    store::{CollectionId, ItemId},
};

/// Commands that can be sent to the background worker
#[derive(Debug)]
pub enum RebalanceCommand {
    /// Rebalance one collection immediately, bypassing the queue
    RebalanceNow {
        collection: CollectionId,
        response: oneshot::Sender<Result<BTreeMap<ItemId, RankKey>>>,
    },
    /// Process everything queued right now; responds with the number rebalanced
    Flush { response: oneshot::Sender<usize> },
    /// Stop the worker
    Shutdown,
}

/// Background worker that owns queue processing for one coordinator
pub struct RebalanceWorker {
    coordinator: Arc<ReorderCoordinator>,
    interval: Duration,
    command_rx: mpsc::Receiver<RebalanceCommand>,
}

impl RebalanceWorker {
    /// Start the worker and return a handle for sending it commands.
    ///
    /// Scheduling comes from the coordinator's `worker` configuration.
    pub fn start(coordinator: Arc<ReorderCoordinator>) -> RebalanceHandle {
        let worker_config = coordinator.config().worker;
        let (tx, rx) = mpsc::channel(worker_config.command_buffer);

        let worker = Self {
            coordinator,
            interval: worker_config.interval(),
            command_rx: rx,
        };

        // Try to spawn in current runtime, or create one if needed
        if tokio::runtime::Handle::try_current().is_ok() {
            tokio::spawn(worker.run());
        } else {
            std::thread::spawn(|| match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(worker.run()),
                Err(e) => error!("Failed to create runtime for rebalance worker: {e}"),
            });
        }
        RebalanceHandle { command_tx: tx }
    }

    /// Main event loop
    async fn run(mut self) {
        async move {
            info!("Starting rebalance worker");
            let mut tick = interval(self.interval);
            // Skip initial tick to avoid immediate execution
            tick.tick().await;

            loop {
                tokio::select! {
                    command = self.command_rx.recv() => {
                        match command {
                            Some(RebalanceCommand::Shutdown) | None => break,
                            Some(command) => self.handle_command(command).await,
                        }
                    }

                    _ = tick.tick() => {
                        self.process_queue().await;
                    }
                }
            }
            info!("Rebalance worker shutting down");
        }
        .instrument(info_span!("rebalance_worker"))
        .await
    }

    async fn handle_command(&mut self, command: RebalanceCommand) {
        match command {
            RebalanceCommand::RebalanceNow {
                collection,
                response,
            } => {
                let result = self.coordinator.rebalance_with_retry(&collection).await;
                let _ = response.send(result);
            }
            RebalanceCommand::Flush { response } => {
                let count = self.process_queue().await;
                let _ = response.send(count);
            }
            RebalanceCommand::Shutdown => {}
        }
    }

    /// Rebalances every queued collection; returns how many succeeded.
    async fn process_queue(&self) -> usize {
        let queue = self.coordinator.rebalance_queue();
        let pending = queue.drain();
        if pending.is_empty() {
            return 0;
        }
        debug!(count = pending.len(), "Processing rebalance queue");

        let mut rebalanced = 0;
        for collection in pending {
            match self.coordinator.rebalance_with_retry(&collection).await {
                Ok(_) => rebalanced += 1,
                Err(e) if e.is_rebalance_conflict() => {
                    warn!(collection = %collection, "Rebalance still conflicting, requeueing: {e}");
                    queue.schedule(collection);
                }
                Err(e) => {
                    // Log and drop; the next long key in this collection queues it again
                    error!(collection = %collection, "Rebalance failed: {e}");
                }
            }
        }
        rebalanced
    }
}

/// Cloneable handle for talking to a running [`RebalanceWorker`].
#[derive(Debug, Clone)]
pub struct RebalanceHandle {
    command_tx: mpsc::Sender<RebalanceCommand>,
}

impl RebalanceHandle {
    /// Rebalance one collection now and wait for the result.
    pub async fn rebalance_now(
        &self,
        collection: CollectionId,
    ) -> Result<BTreeMap<ItemId, RankKey>> {
        let (response, rx) = oneshot::channel();
        self.send(RebalanceCommand::RebalanceNow {
            collection,
            response,
        })
        .await?;
        rx.await.map_err(|_| unavailable("worker dropped the request"))?
    }

    /// Process the queue now and wait; returns the number of collections rebalanced.
    pub async fn flush(&self) -> Result<usize> {
        let (response, rx) = oneshot::channel();
        self.send(RebalanceCommand::Flush { response }).await?;
        rx.await
            .map_err(|_| unavailable("worker dropped the request").into())
    }

    /// Ask the worker to stop. Queued candidates stay queued.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(RebalanceCommand::Shutdown).await
    }

    pub fn is_running(&self) -> bool {
        !self.command_tx.is_closed()
    }

    async fn send(&self, command: RebalanceCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| unavailable("worker is not running").into())
    }
}

fn unavailable(reason: &str) -> CoordinatorError {
    CoordinatorError::WorkerUnavailable {
        reason: reason.to_string(),
    }
}
