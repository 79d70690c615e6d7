//! Tritwise logical operations, implemented for both a single `Trit`
//! and a whole `TritArray`.

use super::array::TritArray;
use super::Trit;

/// Kleene-style tritwise logical operations.
pub trait TritOps {
    fn ternary_neg(&self) -> Self;
    fn ternary_min(&self, other: &Self) -> Self;
    fn ternary_max(&self, other: &Self) -> Self;
    /// Consensus: agree if equal, `Zero` otherwise.
    fn ternary_consensus(&self, other: &Self) -> Self;
}

impl TritOps for Trit {
    fn ternary_neg(&self) -> Self {
        self.negate()
    }

    fn ternary_min(&self, other: &Self) -> Self {
        if self.to_i8() <= other.to_i8() {
            *self
        } else {
            *other
        }
    }

    fn ternary_max(&self, other: &Self) -> Self {
        if self.to_i8() >= other.to_i8() {
            *self
        } else {
            *other
        }
    }

    fn ternary_consensus(&self, other: &Self) -> Self {
        if self == other {
            *self
        } else {
            Trit::Zero
        }
    }
}

impl TritOps for TritArray {
    fn ternary_neg(&self) -> Self {
        self.negate()
    }

    fn ternary_min(&self, other: &Self) -> Self {
        zip_map(self, other, |a, b| a.ternary_min(&b))
    }

    fn ternary_max(&self, other: &Self) -> Self {
        zip_map(self, other, |a, b| a.ternary_max(&b))
    }

    fn ternary_consensus(&self, other: &Self) -> Self {
        zip_map(self, other, |a, b| a.ternary_consensus(&b))
    }
}

fn zip_map(a: &TritArray, b: &TritArray, f: impl Fn(Trit, Trit) -> Trit) -> TritArray {
    let len = a.len().max(b.len());
    let trits = (0..len).map(|i| f(a.get(i), b.get(i))).collect();
    TritArray::from_trits(trits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trit_min_max_are_dual() {
        for a in Trit::ALL {
            for b in Trit::ALL {
                assert_eq!(a.ternary_min(&b).negate(), a.negate().ternary_max(&b.negate()));
            }
        }
    }

    #[test]
    fn consensus_is_identity_on_equal_inputs() {
        for a in Trit::ALL {
            assert_eq!(a.ternary_consensus(&a), a);
        }
    }

    #[test]
    fn array_ops_are_elementwise() {
        let a = TritArray::from_trits(vec![Trit::Positive, Trit::Negative]);
        let b = TritArray::from_trits(vec![Trit::Negative, Trit::Negative]);
        let min = a.ternary_min(&b);
        assert_eq!(min.trits(), &[Trit::Negative, Trit::Negative]);
    }
}
