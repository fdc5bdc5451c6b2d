//! Constants used throughout the Rankboard library.
//!
//! Central definitions for default key-space parameters and limits.

/// Default rank alphabet: digits then uppercase letters (radix 36).
pub const DEFAULT_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Smallest alphabet that still leaves room between any two keys.
pub const MIN_RADIX: usize = 2;

/// Key length above which a collection is reported as a rebalance candidate.
pub const DEFAULT_REBALANCE_THRESHOLD: usize = 8;

/// Minimum length of keys produced by a rebalance pass.
pub const DEFAULT_SPREAD_MIN_LENGTH: usize = 2;

/// Key-space capacity a rebalance reserves, as a multiple of the item count.
pub const DEFAULT_SPREAD_HEADROOM: usize = 2;

/// Upper bound on rebalance key length; anything longer means the count is absurd.
pub const MAX_SPREAD_LENGTH: usize = 16;

/// Separator between project and column in a textual collection id.
pub const COLLECTION_SEPARATOR: char = '/';

/// Attempts `rebalance_with_retry` makes before giving up, including the first.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 4;

/// Delay before the first rebalance retry, in milliseconds.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 25;

/// Ceiling for a single rebalance retry delay, in milliseconds.
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 1000;

/// How often the background worker drains the rebalance queue, in milliseconds.
pub const DEFAULT_WORKER_INTERVAL_MS: u64 = 5000;

/// Capacity of the background worker's command channel.
pub const DEFAULT_WORKER_COMMAND_BUFFER: usize = 100;

/// Version of the JSON file written by `InMemoryStore::save_to_file`.
/// v0 is unstable and may change incompatibly.
pub const PERSISTENCE_VERSION: u8 = 0;
