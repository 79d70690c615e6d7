//! A single balanced ternary digit.
//!
//! A trit holds one of three values: -1, 0, or +1. `Unknown` is
//! deliberately *not* a variant here — it is an out-of-band computation
//! sentinel (`Option<Trit>`) that must never be stored in memory or a
//! register of a running machine.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

/// A single balanced ternary digit.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum Trit {
    /// -1
    Negative = -1,
    /// 0
    Zero = 0,
    /// +1
    Positive = 1,
}

impl Trit {
    /// All three trit values, in ascending order.
    pub const ALL: [Trit; 3] = [Trit::Negative, Trit::Zero, Trit::Positive];

    /// Build a trit from a signed value in `{-1, 0, 1}`.
    ///
    /// Returns `None` for any other value (the caller's Unknown case).
    #[inline]
    pub const fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Trit::Negative),
            0 => Some(Trit::Zero),
            1 => Some(Trit::Positive),
            _ => None,
        }
    }

    /// The signed integer value of this trit.
    #[inline]
    pub const fn to_i8(self) -> i8 {
        self as i8
    }

    /// A trit is valid by construction; this predicate exists for callers
    /// that hold a raw integer and want to check before calling
    /// [`Trit::from_i8`].
    #[inline]
    pub const fn is_valid(value: i8) -> bool {
        matches!(value, -1..=1)
    }

    /// Negate: -1 <-> +1, 0 stays 0.
    #[inline]
    pub const fn negate(self) -> Self {
        match self {
            Trit::Negative => Trit::Positive,
            Trit::Zero => Trit::Zero,
            Trit::Positive => Trit::Negative,
        }
    }

    /// Single-trit multiplication (never carries).
    #[inline]
    pub const fn mul(self, other: Self) -> Self {
        match (self, other) {
            (Trit::Zero, _) | (_, Trit::Zero) => Trit::Zero,
            (Trit::Positive, Trit::Positive) | (Trit::Negative, Trit::Negative) => Trit::Positive,
            (Trit::Positive, Trit::Negative) | (Trit::Negative, Trit::Positive) => Trit::Negative,
        }
    }

    /// Half-adder sum of two trits, wrapped into `{-1, 0, 1}`.
    #[inline]
    pub const fn sum(self, other: Self) -> Self {
        match self.to_i8() + other.to_i8() {
            -2 => Trit::Positive,
            -1 => Trit::Negative,
            0 => Trit::Zero,
            1 => Trit::Positive,
            2 => Trit::Negative,
            _ => unreachable!(),
        }
    }

    /// Half-adder carry of two trits.
    #[inline]
    pub const fn half_carry(self, other: Self) -> Self {
        match self.to_i8() + other.to_i8() {
            -2 => Trit::Negative,
            2 => Trit::Positive,
            _ => Trit::Zero,
        }
    }

    /// Add two trits with an incoming carry, returning `(result, carry_out)`.
    ///
    /// sum = a+b+c_in is remapped into balanced range with
    /// -2 -> (+1,-1), -1 -> (-1,0), 0 -> (0,0), +1 -> (+1,0), +2 -> (-1,+1).
    #[inline]
    pub const fn add_with_carry(self, other: Self, carry_in: Self) -> (Self, Self) {
        let total = self.to_i8() + other.to_i8() + carry_in.to_i8();
        match total {
            -3 => (Trit::Zero, Trit::Negative),
            -2 => (Trit::Positive, Trit::Negative),
            -1 => (Trit::Negative, Trit::Zero),
            0 => (Trit::Zero, Trit::Zero),
            1 => (Trit::Positive, Trit::Zero),
            2 => (Trit::Negative, Trit::Positive),
            3 => (Trit::Zero, Trit::Positive),
            _ => unreachable!(),
        }
    }

    /// `true` iff this trit is zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        matches!(self, Trit::Zero)
    }

    /// `true` iff this trit is positive.
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, Trit::Positive)
    }

    /// `true` iff this trit is negative.
    #[inline]
    pub const fn is_negative(self) -> bool {
        matches!(self, Trit::Negative)
    }

    /// Parse a single trit character using the '-', '0', '+' alphabet.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(Trit::Negative),
            '0' => Some(Trit::Zero),
            '+' => Some(Trit::Positive),
            _ => None,
        }
    }

    /// Render this trit using the '-', '0', '+' alphabet.
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Trit::Negative => '-',
            Trit::Zero => '0',
            Trit::Positive => '+',
        }
    }
}

impl Default for Trit {
    fn default() -> Self {
        Trit::Zero
    }
}

impl fmt::Debug for Trit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trit::Negative => "Negative",
            Trit::Zero => "Zero",
            Trit::Positive => "Positive",
        })
    }
}

impl fmt::Display for Trit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.to_char())
    }
}

impl std::ops::Neg for Trit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl TryFrom<i8> for Trit {
    type Error = ();

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Trit::from_i8(value).ok_or(())
    }
}

impl From<Trit> for i8 {
    fn from(trit: Trit) -> Self {
        trit.to_i8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_is_an_involution() {
        for t in Trit::ALL {
            assert_eq!(t.negate().negate(), t);
        }
    }

    #[test]
    fn sum_is_commutative() {
        for a in Trit::ALL {
            for b in Trit::ALL {
                assert_eq!(a.sum(b), b.sum(a));
            }
        }
    }

    #[test]
    fn add_with_carry_matches_spec_table() {
        // sum = a+b+c_in, remapped into balanced range
        assert_eq!(
            Trit::Positive.add_with_carry(Trit::Positive, Trit::Zero),
            (Trit::Negative, Trit::Positive)
        ); // +2 -> (-1, +1)
        assert_eq!(
            Trit::Negative.add_with_carry(Trit::Negative, Trit::Zero),
            (Trit::Positive, Trit::Negative)
        ); // -2 -> (+1, -1)
        assert_eq!(
            Trit::Zero.add_with_carry(Trit::Zero, Trit::Zero),
            (Trit::Zero, Trit::Zero)
        );
    }

    #[test]
    fn from_i8_rejects_out_of_range() {
        assert_eq!(Trit::from_i8(2), None);
        assert_eq!(Trit::from_i8(-2), None);
    }

    #[test]
    fn char_roundtrip() {
        for t in Trit::ALL {
            assert_eq!(Trit::from_char(t.to_char()), Some(t));
        }
    }

    #[test]
    fn mul_table() {
        assert_eq!(Trit::Negative.mul(Trit::Negative), Trit::Positive);
        assert_eq!(Trit::Negative.mul(Trit::Positive), Trit::Negative);
        assert_eq!(Trit::Zero.mul(Trit::Positive), Trit::Zero);
    }
}
