//! Algebraic property derivation for dyadic gates: commutativity,
//! associativity, identity element, value-preservation, and a Post-class
//! mask (only the P0/P1/P_1 value-preservation bits are load-bearing).

use crate::trit::Trit;

use super::eval::eval_dyadic;
use super::tables::GateTable;

/// Post-class bits. Only the first three (value-preservation at each
/// constant) are load-bearing; the remaining three are carried for
/// completeness but not required to be correct beyond "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostClass(u8);

impl PostClass {
    pub const PRESERVES_NEGATIVE: PostClass = PostClass(0b0000_0001);
    pub const PRESERVES_ZERO: PostClass = PostClass(0b0000_0010);
    pub const PRESERVES_POSITIVE: PostClass = PostClass(0b0000_0100);
    pub const SELF_DUAL: PostClass = PostClass(0b0000_1000);
    pub const MONOTONE: PostClass = PostClass(0b0001_0000);
    pub const LINEAR: PostClass = PostClass(0b0010_0000);

    pub const fn empty() -> Self {
        PostClass(0)
    }

    pub const fn contains(self, other: PostClass) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for PostClass {
    type Output = PostClass;

    fn bitor(self, rhs: PostClass) -> PostClass {
        PostClass(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for PostClass {
    fn bitor_assign(&mut self, rhs: PostClass) {
        self.0 |= rhs.0;
    }
}

/// Derived algebraic properties of a single dyadic gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Properties {
    pub commutative: bool,
    pub associative: bool,
    /// `Some(e)` if an identity element exists, `None` otherwise.
    pub identity: Option<Trit>,
    pub post_class: PostClass,
}

/// Derive the full property set for gate `id` by exhaustive enumeration.
pub fn derive(table: &GateTable, id: u32) -> Option<Properties> {
    table.dyadic_row(id)?;
    let f = |a: Trit, b: Trit| eval_dyadic(table, id, a, b).expect("id validated above");

    Some(Properties {
        commutative: is_commutative(f),
        associative: is_associative(f),
        identity: identity_element(f),
        post_class: post_class(f),
    })
}

fn is_commutative(f: impl Fn(Trit, Trit) -> Trit) -> bool {
    for &a in &Trit::ALL {
        for &b in &Trit::ALL {
            if f(a, b) != f(b, a) {
                return false;
            }
        }
    }
    true
}

fn is_associative(f: impl Fn(Trit, Trit) -> Trit) -> bool {
    for &a in &Trit::ALL {
        for &b in &Trit::ALL {
            for &c in &Trit::ALL {
                if f(f(a, b), c) != f(a, f(b, c)) {
                    return false;
                }
            }
        }
    }
    true
}

fn identity_element(f: impl Fn(Trit, Trit) -> Trit) -> Option<Trit> {
    for &e in &Trit::ALL {
        let mut works = true;
        for &x in &Trit::ALL {
            if f(e, x) != x || f(x, e) != x {
                works = false;
                break;
            }
        }
        if works {
            return Some(e);
        }
    }
    None
}

fn preserves(f: &impl Fn(Trit, Trit) -> Trit, v: Trit) -> bool {
    f(v, v) == v
}

fn post_class(f: impl Fn(Trit, Trit) -> Trit) -> PostClass {
    let mut mask = PostClass::empty();
    if preserves(&f, Trit::Negative) {
        mask |= PostClass::PRESERVES_NEGATIVE;
    }
    if preserves(&f, Trit::Zero) {
        mask |= PostClass::PRESERVES_ZERO;
    }
    if preserves(&f, Trit::Positive) {
        mask |= PostClass::PRESERVES_POSITIVE;
    }
    mask
}

/// Render the 9-cell truth table of `id` using the same pair-index
/// scheme as [`super::tables`], for diagnostics/CLI display.
pub fn truth_table(table: &GateTable, id: u32) -> Option<String> {
    let row = table.dyadic_row(id)?;
    let mut out = String::from("  a  b  f\n");
    for &a in &Trit::ALL {
        for &b in &Trit::ALL {
            let idx = super::tables::well_known::pair_index(a, b);
            out.push_str(&format!("  {a}  {b}  {}\n", row[idx]));
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::tables::well_known;

    #[test]
    fn kleene_and_is_commutative_and_associative_with_identity() {
        let table = GateTable::standard();
        let props = derive(table, well_known::KLEENE_AND).unwrap();
        assert!(props.commutative);
        assert!(props.associative);
        assert_eq!(props.identity, Some(Trit::Positive));
    }

    #[test]
    fn non_commutative_gate_is_detected() {
        // a 1-sided gate: returns `a` unconditionally (projection) — commutative
        // only if it also ignores `b` symmetrically, which it does not when a != b.
        let table = GateTable::standard();
        // build a custom id whose table is the "always a" projection.
        let cells: [Trit; 9] = {
            let mut cells = [Trit::Zero; 9];
            for &a in &Trit::ALL {
                for &b in &Trit::ALL {
                    cells[well_known::pair_index(a, b)] = a;
                }
            }
            cells
        };
        let id = well_known::encode_dyadic(cells);
        let props = derive(table, id).unwrap();
        assert!(!props.commutative);
    }

    #[test]
    fn invalid_id_derives_nothing() {
        let table = GateTable::standard();
        assert_eq!(derive(table, 19_683), None);
    }
}
