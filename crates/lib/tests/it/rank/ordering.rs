use std::collections::BTreeSet;

use rand::{Rng, SeedableRng, rngs::StdRng};
use rankboard::{Alphabet, RankEngine, RankKey, Ranker};

/// Inserts `ops` keys at random positions of a list, the way a user drags cards
/// around, and checks the list stays strictly sorted after every insert.
fn simulate_inserts<R: Ranker>(ranker: &R, seed: u64, ops: usize) -> Vec<R::Key> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut keys: Vec<R::Key> = Vec::new();
    for _ in 0..ops {
        let at = rng.gen_range(0..=keys.len());
        let low = at.checked_sub(1).map(|i| &keys[i]);
        let high = keys.get(at);
        let key = ranker.rank_between(low, high).unwrap();
        if let Some(low) = low {
            assert!(*low < key, "{low:?} !< {key:?}");
        }
        if let Some(high) = high {
            assert!(key < *high, "{key:?} !< {high:?}");
        }
        keys.insert(at, key);
    }
    keys
}

#[test]
fn test_random_inserts_keep_string_keys_ordered() {
    for alphabet in ["01", "0123456789A", rankboard::constants::DEFAULT_ALPHABET] {
        let engine = RankEngine::new(Alphabet::new(alphabet).unwrap());
        let keys = simulate_inserts(&engine, 7, 2000);
        let distinct: BTreeSet<&RankKey> = keys.iter().collect();
        assert_eq!(distinct.len(), keys.len());
        for key in &keys {
            engine.validate(key).unwrap();
        }
    }
}

#[test]
fn test_front_loaded_inserts() {
    // Every new card goes to the top of the column
    let engine = RankEngine::default();
    let mut first = engine.initial();
    for _ in 0..5000 {
        let next = engine.rank_between(None, Some(&first)).unwrap();
        assert!(next < first);
        first = next;
    }
    assert!(first.len() <= 8);
}

#[test]
fn test_hot_spot_inserts_grow_and_rebalance_resets() {
    // Always inserting right after the same card is the worst case for bisection
    let engine = RankEngine::default();
    let anchor = engine.initial();
    let mut next = engine.after(&anchor).unwrap();
    for _ in 0..100 {
        next = engine.between(&anchor, &next).unwrap();
    }
    assert!(engine.needs_rebalance(&next, 8));

    let fresh = engine.spread(102).unwrap();
    assert!(fresh.iter().all(|key| !engine.needs_rebalance(key, 8)));
    assert!(fresh.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_spread_then_insert_everywhere() {
    let engine = RankEngine::default();
    let keys = engine.spread(50).unwrap();
    for pair in keys.windows(2) {
        let mid = engine.between(&pair[0], &pair[1]).unwrap();
        assert!(pair[0] < mid && mid < pair[1]);
    }
    let first = engine.before(&keys[0]).unwrap();
    let last = engine.after(&keys[49]).unwrap();
    assert!(first < keys[0]);
    assert!(last > keys[49]);
}

#[cfg(feature = "numeric")]
mod numeric {
    use rankboard::rank::{NumericKey, NumericRanker};

    use super::*;

    #[test]
    fn test_random_inserts_keep_numeric_keys_ordered() {
        let ranker = NumericRanker::default();
        let keys = simulate_inserts(&ranker, 11, 300);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_numeric_rebalance_restores_room() {
        let ranker = NumericRanker::new(1.0, 1e-3).unwrap();
        let low = NumericKey(1.0);
        let mut high = NumericKey(2.0);
        while !ranker.needs_rebalance(low, high) {
            high = ranker.between(&low, &high).unwrap();
        }

        let fresh = ranker.spread(3).unwrap();
        assert!(!ranker.needs_rebalance(fresh[0], fresh[1]));
        assert!(ranker.between(&fresh[0], &fresh[1]).is_ok());
    }
}
