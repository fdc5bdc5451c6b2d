//! String rank key engine.
//!
//! Keys are read as base-`radix` fractions `0.d1d2...dn` over the engine's
//! alphabet. A canonical key never ends in the minimum digit, so byte order
//! matches numeric order and any two distinct keys always have room between
//! them. Every function here is pure and runs in time linear in key length.

use std::iter;

use super::{Alphabet, RankKey, Ranker, errors::RankError};
use crate::{
    Result,
    config::RankConfig,
    constants::{DEFAULT_SPREAD_HEADROOM, DEFAULT_SPREAD_MIN_LENGTH, MAX_SPREAD_LENGTH},
};

/// Digit of the lowest character that may end a key.
const LOWEST_TAIL: u8 = 1;

/// Generates and checks string rank keys over a fixed alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEngine {
    alphabet: Alphabet,
    spread_min_length: usize,
    spread_headroom: usize,
}

impl Default for RankEngine {
    fn default() -> Self {
        Self::new(Alphabet::default())
    }
}

impl RankEngine {
    /// Creates an engine with default rebalance spacing.
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            spread_min_length: DEFAULT_SPREAD_MIN_LENGTH,
            spread_headroom: DEFAULT_SPREAD_HEADROOM,
        }
    }

    /// Creates an engine from a validated configuration.
    pub fn from_config(config: &RankConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            alphabet: config.alphabet.clone(),
            spread_min_length: config.spread_min_length,
            spread_headroom: config.spread_headroom,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Checks that `key` is a canonical key over this engine's alphabet.
    pub fn validate(&self, key: &RankKey) -> Result<()> {
        self.digits(key).map(|_| ())
    }

    /// The key for the first item of an empty collection.
    ///
    /// A single character from the middle of the alphabet, leaving room on
    /// both sides.
    pub fn initial(&self) -> RankKey {
        self.encode(&[(self.alphabet.radix() / 2) as u8])
    }

    /// A key sorting strictly before `key`.
    ///
    /// Subtracts one unit at the key's own length, borrowing from the right
    /// and padding with the maximum character. When the key is already the
    /// smallest key of its length (`"0...01"`), the result doubles the length
    /// to `"0"*len + "Z"*len`, so repeated prepends grow keys logarithmically.
    ///
    /// # Errors
    /// Returns `RankError::InvalidKey` if `key` is not canonical. In particular
    /// `"0"` has no predecessor and is rejected.
    pub fn before(&self, key: &RankKey) -> Result<RankKey> {
        let mut digits = self.digits(key)?;
        let max = self.alphabet.max_digit();
        let last = digits.len() - 1;

        if digits[last] > LOWEST_TAIL {
            digits[last] -= 1;
            return Ok(self.encode(&digits));
        }

        match (0..last).rev().find(|&i| digits[i] > 0) {
            Some(i) => {
                digits[i] -= 1;
                digits[i + 1..].fill(max);
            }
            None => {
                let len = digits.len();
                digits = iter::repeat_n(0, len)
                    .chain(iter::repeat_n(max, len))
                    .collect();
            }
        }
        Ok(self.encode(&digits))
    }

    /// A key sorting strictly after `key`.
    ///
    /// Adds one unit at the key's own length, carrying to the left; positions
    /// behind the carry reset to the minimum and the last position becomes the
    /// lowest non-minimum character. When every character is already the
    /// maximum the key is extended to double its length, so `k` consecutive
    /// appends grow keys by `O(log k)` characters.
    pub fn after(&self, key: &RankKey) -> Result<RankKey> {
        let mut digits = self.digits(key)?;
        let max = self.alphabet.max_digit();
        let last = digits.len() - 1;

        if digits[last] < max {
            digits[last] += 1;
            return Ok(self.encode(&digits));
        }

        match (0..last).rev().find(|&i| digits[i] < max) {
            Some(i) => {
                digits[i] += 1;
                digits[i + 1..last].fill(0);
                digits[last] = LOWEST_TAIL;
            }
            None => {
                let len = digits.len();
                digits.extend(iter::repeat_n(0, len - 1));
                digits.push(LOWEST_TAIL);
            }
        }
        Ok(self.encode(&digits))
    }

    /// A key sorting strictly between `before` and `after`.
    ///
    /// # Errors
    /// Returns `RankError::InvalidOrdering` unless `before < after`, and
    /// `RankError::InvalidKey` if either key is not canonical.
    pub fn between(&self, before: &RankKey, after: &RankKey) -> Result<RankKey> {
        let low = self.digits(before)?;
        let high = self.digits(after)?;
        if before >= after {
            return Err(RankError::InvalidOrdering {
                before: before.to_string(),
                after: after.to_string(),
            }
            .into());
        }
        Ok(self.encode(&self.midpoint(&low, Some(&high))))
    }

    /// Dispatches on which neighbors are present.
    ///
    /// `(None, None)` is [`initial`](Self::initial), a lone lower neighbor is
    /// [`after`](Self::after), a lone upper neighbor is
    /// [`before`](Self::before), and two neighbors are
    /// [`between`](Self::between).
    pub fn rank_between(
        &self,
        before: Option<&RankKey>,
        after: Option<&RankKey>,
    ) -> Result<RankKey> {
        Ranker::rank_between(self, before, after)
    }

    /// True when `key` is longer than `threshold_length` characters.
    ///
    /// Long keys mean the neighborhood has been bisected many times and the
    /// collection should be rebalanced soon.
    pub fn needs_rebalance(&self, key: &RankKey, threshold_length: usize) -> bool {
        key.len() > threshold_length
    }

    /// `count` fresh, evenly spaced, ascending keys of a short fixed length.
    ///
    /// The length is the smallest `L >= spread_min_length` with
    /// `radix^L >= headroom * count`. Trailing minimum characters are stripped
    /// so some keys come out shorter than `L`; order is unaffected.
    pub fn spread(&self, count: usize) -> Result<Vec<RankKey>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let length = self.spread_length(count)?;
        let capacity = (self.alphabet.radix() as u128).pow(length as u32);
        let step = capacity / (count as u128 + 1);
        Ok((1..=count as u128)
            .map(|i| self.encode_fixed(i * step, length))
            .collect())
    }

    /// Length of the keys [`spread`](Self::spread) assigns to `count` items.
    ///
    /// Grows with the count, so a large collection can rebalance to keys
    /// longer than a small rebalance threshold.
    pub fn spread_length(&self, count: usize) -> Result<usize> {
        let exhausted = || RankError::KeySpaceExhausted {
            reason: format!("cannot spread {count} keys within {MAX_SPREAD_LENGTH} characters"),
        };
        let radix = self.alphabet.radix() as u128;
        let slots = count as u128 + 1;
        let needed = (count as u128)
            .checked_mul(self.spread_headroom as u128)
            .ok_or_else(exhausted)?
            .max(slots);

        let mut length = self.spread_min_length.max(1);
        let mut capacity = radix
            .checked_pow(length as u32)
            .ok_or_else(exhausted)?;
        while capacity < needed {
            length += 1;
            capacity = capacity.checked_mul(radix).ok_or_else(exhausted)?;
        }
        if length > MAX_SPREAD_LENGTH {
            return Err(exhausted().into());
        }
        Ok(length)
    }

    /// Decodes a key into digit indices, enforcing the canonical form.
    fn digits(&self, key: &RankKey) -> Result<Vec<u8>> {
        let invalid = |reason: String| RankError::InvalidKey {
            key: key.to_string(),
            reason,
        };

        if key.is_empty() {
            return Err(invalid("key is empty".to_string()).into());
        }

        let digits = key
            .as_str()
            .bytes()
            .map(|byte| {
                self.alphabet.digit(byte).ok_or_else(|| {
                    invalid(format!(
                        "character '{}' is not in alphabet '{}'",
                        byte as char, self.alphabet
                    ))
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if digits.last() == Some(&0) {
            return Err(invalid(format!(
                "key ends with the minimum character '{}'",
                self.alphabet.min_symbol()
            ))
            .into());
        }
        Ok(digits)
    }

    fn encode(&self, digits: &[u8]) -> RankKey {
        RankKey::new(
            digits
                .iter()
                .map(|&d| self.alphabet.symbol(d) as char)
                .collect::<String>(),
        )
    }

    /// Encodes `value / radix^length` as a key, dropping trailing zeros.
    fn encode_fixed(&self, mut value: u128, length: usize) -> RankKey {
        let radix = self.alphabet.radix() as u128;
        let mut digits = vec![0u8; length];
        for slot in digits.iter_mut().rev() {
            *slot = (value % radix) as u8;
            value /= radix;
        }
        while digits.last() == Some(&0) {
            digits.pop();
        }
        self.encode(&digits)
    }

    /// Digits strictly between `low` and `high` (or 1.0 when `high` is absent).
    ///
    /// `low` is implicitly padded with zeros. Requires `low < high`.
    fn midpoint(&self, low: &[u8], high: Option<&[u8]>) -> Vec<u8> {
        let radix = self.alphabet.radix();
        let mut out = Vec::with_capacity(low.len().max(high.map_or(0, <[u8]>::len)) + 1);
        let mut low = low;
        let mut high = high;

        if let Some(h) = high {
            let shared = h
                .iter()
                .enumerate()
                .take_while(|&(i, &d)| low.get(i).copied().unwrap_or(0) == d)
                .count();
            debug_assert!(shared < h.len(), "low must sort before high");
            out.extend_from_slice(&h[..shared]);
            low = low.get(shared..).unwrap_or(&[]);
            high = Some(&h[shared..]);
        }

        loop {
            let low_digit = low.first().copied().unwrap_or(0) as usize;
            let high_digit = high.map_or(radix, |h| h[0] as usize);

            if high_digit - low_digit > 1 {
                out.push(((low_digit + high_digit) / 2) as u8);
                return out;
            }

            // Adjacent digits. A longer upper key leaves room at its own first digit.
            if let Some(h) = high
                && h.len() > 1
            {
                out.push(h[0]);
                return out;
            }

            out.push(low_digit as u8);
            low = low.get(1..).unwrap_or(&[]);
            high = None;
        }
    }
}

impl Ranker for RankEngine {
    type Key = RankKey;

    fn initial(&self) -> RankKey {
        RankEngine::initial(self)
    }

    fn before(&self, key: &RankKey) -> Result<RankKey> {
        RankEngine::before(self, key)
    }

    fn after(&self, key: &RankKey) -> Result<RankKey> {
        RankEngine::after(self, key)
    }

    fn between(&self, before: &RankKey, after: &RankKey) -> Result<RankKey> {
        RankEngine::between(self, before, after)
    }

    fn spread(&self, count: usize) -> Result<Vec<RankKey>> {
        RankEngine::spread(self, count)
    }
}
