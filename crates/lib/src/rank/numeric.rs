//! Floating-point key space.
//!
//! Finite precision means repeated bisection runs out of room after roughly
//! fifty halvings of the same gap. Collections using these keys must be
//! rebalanced far more aggressively than string-keyed ones; check
//! [`NumericRanker::needs_rebalance`] after every insert.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{Ranker, errors::RankError};
use crate::Result;

/// Default distance between neighbors after a spread or an append.
pub const DEFAULT_STEP: f64 = 1024.0;

/// Default gap below which a neighborhood is considered crowded.
pub const DEFAULT_MIN_GAP: f64 = 1e-6;

/// A numeric rank key, totally ordered with `f64::total_cmp`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericKey(pub f64);

impl NumericKey {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for NumericKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NumericKey {}

impl PartialOrd for NumericKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NumericKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for NumericKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates `f64` sort keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRanker {
    step: f64,
    min_gap: f64,
}

impl Default for NumericRanker {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            min_gap: DEFAULT_MIN_GAP,
        }
    }
}

impl NumericRanker {
    /// # Errors
    /// `RankError::InvalidConfig` unless `step` and `min_gap` are finite and
    /// positive with `min_gap < step`.
    pub fn new(step: f64, min_gap: f64) -> Result<Self> {
        let valid = step.is_finite() && min_gap.is_finite() && min_gap > 0.0 && min_gap < step;
        if !valid {
            return Err(RankError::InvalidConfig {
                reason: format!("numeric step {step} and min gap {min_gap} out of range"),
            }
            .into());
        }
        Ok(Self { step, min_gap })
    }

    /// True when the gap between two neighbors is too small for comfort.
    pub fn needs_rebalance(&self, low: NumericKey, high: NumericKey) -> bool {
        (high.0 - low.0).abs() < self.min_gap
    }

    fn check(key: NumericKey) -> Result<f64> {
        if key.0.is_finite() {
            Ok(key.0)
        } else {
            Err(RankError::InvalidKey {
                key: key.to_string(),
                reason: "numeric key is not finite".to_string(),
            }
            .into())
        }
    }

    fn finite(value: f64, what: &str) -> Result<NumericKey> {
        if value.is_finite() {
            Ok(NumericKey(value))
        } else {
            Err(RankError::KeySpaceExhausted {
                reason: format!("{what} overflowed the numeric range"),
            }
            .into())
        }
    }
}

impl Ranker for NumericRanker {
    type Key = NumericKey;

    fn initial(&self) -> NumericKey {
        NumericKey(self.step)
    }

    fn before(&self, key: &NumericKey) -> Result<NumericKey> {
        let value = Self::check(*key)?;
        let next = value - self.step;
        if next >= value {
            return Err(RankError::KeySpaceExhausted {
                reason: format!("step {} vanishes next to {value}", self.step),
            }
            .into());
        }
        Self::finite(next, "before")
    }

    fn after(&self, key: &NumericKey) -> Result<NumericKey> {
        let value = Self::check(*key)?;
        let next = value + self.step;
        if next <= value {
            return Err(RankError::KeySpaceExhausted {
                reason: format!("step {} vanishes next to {value}", self.step),
            }
            .into());
        }
        Self::finite(next, "after")
    }

    fn between(&self, before: &NumericKey, after: &NumericKey) -> Result<NumericKey> {
        let low = Self::check(*before)?;
        let high = Self::check(*after)?;
        if before >= after {
            return Err(RankError::InvalidOrdering {
                before: before.to_string(),
                after: after.to_string(),
            }
            .into());
        }

        let mid = low + (high - low) / 2.0;
        if mid <= low || mid >= high {
            return Err(RankError::KeySpaceExhausted {
                reason: format!("no representable value between {low} and {high}"),
            }
            .into());
        }
        Ok(NumericKey(mid))
    }

    fn spread(&self, count: usize) -> Result<Vec<NumericKey>> {
        (1..=count)
            .map(|i| Self::finite(i as f64 * self.step, "spread"))
            .collect()
    }
}
