//! Ordered character sets that rank keys are built from.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::RankError;
use crate::{
    Result,
    constants::{DEFAULT_ALPHABET, MIN_RADIX},
};

/// An ordered, finite set of ASCII characters used as rank key digits.
///
/// Characters must be printable ASCII and strictly ascending by byte value.
/// That makes plain byte comparison of keys, which is what every storage
/// engine does when sorting strings, agree with the digit order.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alphabet {
    symbols: Vec<u8>,
    /// Reverse lookup from ASCII byte to digit index.
    digits: [Option<u8>; 128],
}

impl Alphabet {
    /// Builds an alphabet from an ordered string of characters.
    ///
    /// # Errors
    /// Returns `RankError::InvalidAlphabet` if the string is shorter than
    /// two characters, contains non-printable or non-ASCII characters, or is
    /// not strictly ascending.
    pub fn new(symbols: impl AsRef<str>) -> Result<Self> {
        let symbols = symbols.as_ref();
        let invalid = |reason: String| RankError::InvalidAlphabet { reason };

        if symbols.len() < MIN_RADIX {
            return Err(invalid(format!(
                "needs at least {MIN_RADIX} characters, got {}",
                symbols.len()
            ))
            .into());
        }

        let bytes = symbols.as_bytes();
        let mut digits = [None; 128];
        for (index, &byte) in bytes.iter().enumerate() {
            if !byte.is_ascii_graphic() {
                return Err(invalid(format!(
                    "character at position {index} is not printable ASCII"
                ))
                .into());
            }
            if index > 0 && bytes[index - 1] >= byte {
                return Err(invalid(format!(
                    "characters must be strictly ascending, '{}' follows '{}'",
                    byte as char,
                    bytes[index - 1] as char
                ))
                .into());
            }
            digits[byte as usize] = Some(index as u8);
        }

        Ok(Self {
            symbols: bytes.to_vec(),
            digits,
        })
    }

    /// Number of distinct characters.
    pub fn radix(&self) -> usize {
        self.symbols.len()
    }

    /// Digit index of a character, or `None` if it is not in the alphabet.
    pub fn digit(&self, symbol: u8) -> Option<u8> {
        self.digits.get(symbol as usize).copied().flatten()
    }

    /// Character for a digit index.
    ///
    /// # Panics
    /// Panics if `digit >= radix()`; engine code only produces in-range digits.
    pub fn symbol(&self, digit: u8) -> u8 {
        self.symbols[digit as usize]
    }

    /// The smallest character.
    pub fn min_symbol(&self) -> char {
        self.symbols[0] as char
    }

    /// The largest character.
    pub fn max_symbol(&self) -> char {
        self.symbols[self.symbols.len() - 1] as char
    }

    /// Largest digit index.
    pub fn max_digit(&self) -> u8 {
        (self.symbols.len() - 1) as u8
    }

    /// The alphabet as a string.
    pub fn as_str(&self) -> &str {
        // Validated as ASCII on construction
        std::str::from_utf8(&self.symbols).unwrap_or_default()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHABET).expect("default alphabet is valid")
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Alphabet").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Alphabet {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Alphabet {
    type Error = crate::Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Alphabet> for String {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.as_str().to_string()
    }
}
