//! Reorder coordinator integration tests
//!
//! Tests are organized by concern:
//! - moves: neighbor resolution and single-key placement
//! - rebalance: crowding detection, order-preserving rebalance and conflict retry
//! - concurrency: interleaved moves and rebalances against one collection
//! - worker: the background rebalance worker

mod rebalance;
mod worker;
