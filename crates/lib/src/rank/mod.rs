//! Rank key generation.
//!
//! This module provides the pure, stateless half of manual ordering: given
//! zero, one or two neighboring keys, produce a key that sorts in the right
//! place. [`RankEngine`] works on strings with unbounded density and is what
//! the [`ReorderCoordinator`](crate::coordinator::ReorderCoordinator) uses.
//! With the `numeric` feature, [`NumericRanker`] offers the same interface
//! over floating-point keys for stores that can only sort numbers.

mod alphabet;
mod engine;
pub mod errors;
mod key;
#[cfg(feature = "numeric")]
mod numeric;


pub use alphabet::Alphabet;
pub use engine::RankEngine;
pub use errors::RankError;
pub use key::RankKey;
#[cfg(feature = "numeric")]
pub use numeric::{NumericKey, NumericRanker};

use crate::Result;

/// A key space supporting insertion anywhere in a sequence.
///
/// Implementations must guarantee `before(k) < k < after(k)` and
/// `low < between(low, high) < high`, and that `spread(n)` returns `n`
/// strictly ascending keys.
pub trait Ranker {
    /// The key type; its `Ord` is the sort order of the collection.
    type Key: Clone + Ord + std::fmt::Debug;

    /// Key for the first item of an empty collection.
    fn initial(&self) -> Self::Key;

    /// A key sorting strictly before `key`.
    fn before(&self, key: &Self::Key) -> Result<Self::Key>;

    /// A key sorting strictly after `key`.
    fn after(&self, key: &Self::Key) -> Result<Self::Key>;

    /// A key sorting strictly between `before` and `after`.
    fn between(&self, before: &Self::Key, after: &Self::Key) -> Result<Self::Key>;

    /// `count` fresh ascending keys spaced evenly over the key space.
    fn spread(&self, count: usize) -> Result<Vec<Self::Key>>;

    /// Picks the right operation for the neighbors that are present.
    fn rank_between(
        &self,
        before: Option<&Self::Key>,
        after: Option<&Self::Key>,
    ) -> Result<Self::Key> {
        match (before, after) {
            (None, None) => Ok(self.initial()),
            (Some(low), None) => self.after(low),
            (None, Some(high)) => self.before(high),
            (Some(low), Some(high)) => self.between(low, high),
        }
    }
}
