//! Dynamic, unbounded-length balanced ternary arrays.
//!
//! Index `i` carries weight `3^i` (little-endian positional semantics).
//! Size is bounded only by available memory; converting a signed 32-bit
//! integer yields at most 21 trits.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Trit;

/// An ordered sequence of valid trits, low-order first.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TritArray {
    trits: Vec<Trit>,
}

/// 21 trits comfortably covers the full range of a signed 32-bit integer.
const MAX_I32_TRITS: usize = 21;

impl TritArray {
    /// An empty array (represents zero).
    pub fn new() -> Self {
        Self { trits: Vec::new() }
    }

    /// An array of `len` zero trits.
    pub fn zeros(len: usize) -> Self {
        Self {
            trits: vec![Trit::Zero; len],
        }
    }

    /// Build directly from a trit vector (low-order first).
    pub fn from_trits(trits: Vec<Trit>) -> Self {
        Self { trits }
    }

    /// Number of trits stored (not the "significant digit count" — trailing
    /// zero trits are not trimmed by construction).
    pub fn len(&self) -> usize {
        self.trits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trits.is_empty()
    }

    /// Get the trit at `index`, or `Zero` past the end (arrays are
    /// conceptually infinite-length, zero-padded above their stored tail).
    pub fn get(&self, index: usize) -> Trit {
        self.trits.get(index).copied().unwrap_or(Trit::Zero)
    }

    /// Set the trit at `index`, growing the array with zeros if needed.
    pub fn set(&mut self, index: usize, value: Trit) {
        if index >= self.trits.len() {
            self.trits.resize(index + 1, Trit::Zero);
        }
        self.trits[index] = value;
    }

    /// Append a trit to the high end.
    pub fn push(&mut self, value: Trit) {
        self.trits.push(value);
    }

    pub fn trits(&self) -> &[Trit] {
        &self.trits
    }

    /// Drop trailing (high-order) zero trits.
    pub fn trimmed(&self) -> Self {
        let mut end = self.trits.len();
        while end > 0 && self.trits[end - 1].is_zero() {
            end -= 1;
        }
        Self {
            trits: self.trits[..end].to_vec(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.trits.iter().all(|t| t.is_zero())
    }

    /// The sign of the highest non-zero trit, or `Zero` if the array is
    /// all-zero.
    pub fn sign(&self) -> Trit {
        for &t in self.trits.iter().rev() {
            if !t.is_zero() {
                return t;
            }
        }
        Trit::Zero
    }

    /// Negate every trit.
    pub fn negate(&self) -> Self {
        Self {
            trits: self.trits.iter().map(|t| t.negate()).collect(),
        }
    }

    /// Convert a signed 32-bit integer to balanced ternary.
    ///
    /// Repeated divmod by 3: remainder 0 -> digit 0, remainder 1 -> digit
    /// +1, remainder 2 -> digit -1 with a carry into the next quotient.
    pub fn from_int(value: i32) -> Self {
        let negative = value < 0;
        let mut magnitude = (value as i64).unsigned_abs();
        let mut trits = Vec::with_capacity(MAX_I32_TRITS);

        while magnitude != 0 {
            let remainder = magnitude % 3;
            let (digit, carry) = match remainder {
                0 => (Trit::Zero, 0),
                1 => (Trit::Positive, 0),
                2 => (Trit::Negative, 1),
                _ => unreachable!(),
            };
            trits.push(digit);
            magnitude = magnitude / 3 + carry;
        }

        let mut array = Self { trits };
        if negative {
            array = array.negate();
        }
        array
    }

    /// Convert back to a signed 32-bit integer.
    ///
    /// Values outside `[i32::MIN, i32::MAX]` don't fit; use
    /// [`TritArray::to_i64`] directly for wider intermediate results.
    pub fn to_int(&self) -> Result<i32, TritError> {
        self.to_i64().try_into().map_err(|_| TritError::ConversionOverflow)
    }

    /// Convert to `i64`, useful for values wider than 21 trits during
    /// intermediate computation (e.g. multiplication results).
    pub fn to_i64(&self) -> i64 {
        let mut result: i64 = 0;
        let mut power: i64 = 1;
        for &t in &self.trits {
            result += t.to_i8() as i64 * power;
            power = power.saturating_mul(3);
        }
        result
    }

    /// Left-shift by `n` positions (multiply by `3^n`): insert `n` zero
    /// trits at the low end.
    pub fn shift_left(&self, n: usize) -> Self {
        let mut trits = vec![Trit::Zero; n];
        trits.extend_from_slice(&self.trits);
        Self { trits }
    }

    /// Right-shift by `n` positions (divide by `3^n`, truncating): drop the
    /// `n` lowest trits.
    pub fn shift_right(&self, n: usize) -> Self {
        if n >= self.trits.len() {
            return Self::new();
        }
        Self {
            trits: self.trits[n..].to_vec(),
        }
    }

    /// Parse from a string over the alphabet `'-'`, `'0'`, `'+'`, most
    /// significant digit first (so the string reads the way a person
    /// would write a balanced ternary number).
    pub fn from_str_alphabet(s: &str) -> Result<Self, TritParseError> {
        let mut trits = Vec::with_capacity(s.len());
        for c in s.chars().rev() {
            trits.push(Trit::from_char(c).ok_or(TritParseError::InvalidChar(c))?);
        }
        Ok(Self { trits })
    }

    /// Render using the `'-'`, `'0'`, `'+'` alphabet, most significant
    /// digit first. Empty arrays render as `"0"`.
    pub fn to_string_alphabet(&self) -> String {
        let trimmed = self.trimmed();
        if trimmed.trits.is_empty() {
            return "0".to_string();
        }
        trimmed.trits.iter().rev().map(|t| t.to_char()).collect()
    }
}

impl fmt::Debug for TritArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TritArray({})", self.to_string_alphabet())
    }
}

impl fmt::Display for TritArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_alphabet())
    }
}

impl std::str::FromStr for TritArray {
    type Err = TritParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_alphabet(s)
    }
}

impl From<i32> for TritArray {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

/// Errors parsing a [`TritArray`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TritParseError {
    #[error("invalid trit character: '{0}' (expected '-', '0', or '+')")]
    InvalidChar(char),
}

/// Errors converting a [`TritArray`] to a fixed-width integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TritError {
    #[error("value does not fit in an i32")]
    ConversionOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_roundtrip() {
        for n in [-10_000, -9841, -1, 0, 1, 9841, 10_000, i32::MAX / 4, i32::MIN / 4] {
            assert_eq!(TritArray::from_int(n).to_int().unwrap(), n, "failed for {n}");
        }
    }

    #[test]
    fn string_roundtrip() {
        for s in ["0", "+", "-", "+0-", "-0+0+"] {
            let parsed = TritArray::from_str_alphabet(s).unwrap();
            assert_eq!(parsed.to_string_alphabet(), s);
        }
    }

    #[test]
    fn scenario_122_decomposes_low_to_high() {
        // 122 -> [-1, -1, -1, -1, -1, +1] low-to-high:
        // -1 - 3 - 9 - 27 - 81 + 243 = 122.
        let array = TritArray::from_int(122);
        let trimmed = array.trimmed();
        assert_eq!(
            trimmed.trits(),
            &[
                Trit::Negative,
                Trit::Negative,
                Trit::Negative,
                Trit::Negative,
                Trit::Negative,
                Trit::Positive,
            ]
        );
        assert_eq!(trimmed.to_int().unwrap(), 122);
    }

    #[test]
    fn shift_left_then_right_is_identity_for_nonnegative() {
        for n in [0, 1, 5, 81, 9841] {
            let array = TritArray::from_int(n);
            for k in [0usize, 1, 3, 7] {
                let shifted = array.shift_left(k).shift_right(k);
                assert_eq!(shifted.to_int().unwrap(), n);
            }
        }
    }

    #[test]
    fn sign_and_is_zero() {
        assert_eq!(TritArray::from_int(0).sign(), Trit::Zero);
        assert_eq!(TritArray::from_int(5).sign(), Trit::Positive);
        assert_eq!(TritArray::from_int(-5).sign(), Trit::Negative);
        assert!(TritArray::from_int(0).is_zero());
    }
}
