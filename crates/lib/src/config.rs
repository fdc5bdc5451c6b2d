//! Configuration for key generation, rebalancing and retries.
//!
//! Every field has a default, so an empty JSON object is a complete
//! configuration:
//!
//! ```
//! use rankboard::RankConfig;
//!
//! let config = RankConfig::from_json_str(r#"{ "rebalance_threshold": 6 }"#).unwrap();
//! assert_eq!(config.rebalance_threshold, 6);
//! assert_eq!(config.alphabet.radix(), 36);
//! ```

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    constants::{
        DEFAULT_REBALANCE_THRESHOLD, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_MAX_ATTEMPTS,
        DEFAULT_RETRY_MAX_DELAY_MS, DEFAULT_SPREAD_HEADROOM, DEFAULT_SPREAD_MIN_LENGTH,
        DEFAULT_WORKER_COMMAND_BUFFER, DEFAULT_WORKER_INTERVAL_MS, MAX_SPREAD_LENGTH,
    },
    rank::{Alphabet, RankError},
};

/// Top-level configuration for a [`ReorderCoordinator`](crate::ReorderCoordinator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Ordered characters keys are built from.
    pub alphabet: Alphabet,
    /// Keys longer than this mark their collection as a rebalance candidate.
    ///
    /// Rebalanced keys grow with the collection (three characters past 60
    /// items in radix 11), so the effective limit for a collection is never
    /// below the length a rebalance of it would assign.
    pub rebalance_threshold: usize,
    /// Minimum length of keys written by a rebalance.
    pub spread_min_length: usize,
    /// Capacity a rebalance reserves, as a multiple of the item count.
    pub spread_headroom: usize,
    /// Backoff for rebalances that lose a race.
    pub retry: RetryPolicy,
    /// Background rebalance scheduling.
    pub worker: WorkerConfig,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::default(),
            rebalance_threshold: DEFAULT_REBALANCE_THRESHOLD,
            spread_min_length: DEFAULT_SPREAD_MIN_LENGTH,
            spread_headroom: DEFAULT_SPREAD_HEADROOM,
            retry: RetryPolicy::default(),
            worker: WorkerConfig::default(),
        }
    }
}

impl RankConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RankConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks cross-field constraints the types cannot express.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| -> crate::Error { RankError::InvalidConfig { reason }.into() };

        if self.rebalance_threshold == 0 {
            return Err(invalid("rebalance_threshold must be at least 1".to_string()));
        }
        if self.spread_min_length == 0 || self.spread_min_length > MAX_SPREAD_LENGTH {
            return Err(invalid(format!(
                "spread_min_length must be between 1 and {MAX_SPREAD_LENGTH}, got {}",
                self.spread_min_length
            )));
        }
        if self.spread_headroom < DEFAULT_SPREAD_HEADROOM {
            return Err(invalid(format!(
                "spread_headroom must be at least {DEFAULT_SPREAD_HEADROOM}, got {}",
                self.spread_headroom
            )));
        }
        if self.rebalance_threshold < self.spread_min_length {
            return Err(invalid(format!(
                "rebalance_threshold {} is shorter than rebalanced keys ({})",
                self.rebalance_threshold, self.spread_min_length
            )));
        }
        self.retry.validate()?;
        self.worker.validate()
    }
}

/// Exponential backoff for retrying conflicted rebalances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub base_delay_ms: u64,
    /// Ceiling for a single delay.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based), without jitter.
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry.saturating_sub(1)).unwrap_or(u64::MAX);
        Duration::from_millis(
            self.base_delay_ms
                .saturating_mul(factor)
                .min(self.max_delay_ms),
        )
    }

    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(RankError::InvalidConfig {
                reason: "retry.max_attempts must be at least 1".to_string(),
            }
            .into());
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(RankError::InvalidConfig {
                reason: format!(
                    "retry.base_delay_ms {} exceeds retry.max_delay_ms {}",
                    self.base_delay_ms, self.max_delay_ms
                ),
            }
            .into());
        }
        Ok(())
    }
}

/// Scheduling of the background [`RebalanceWorker`](crate::coordinator::RebalanceWorker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// How often queued rebalance candidates are processed.
    pub interval_ms: u64,
    /// Capacity of the worker's command channel.
    pub command_buffer: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_WORKER_INTERVAL_MS,
            command_buffer: DEFAULT_WORKER_COMMAND_BUFFER,
        }
    }
}

impl WorkerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 || self.command_buffer == 0 {
            return Err(RankError::InvalidConfig {
                reason: "worker.interval_ms and worker.command_buffer must be positive".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
