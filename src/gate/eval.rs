//! Gate evaluation: two table lookups for dyadic, one for monadic.

use super::tables::{well_known, GateTable};
use crate::trit::Trit;

/// Evaluate a dyadic gate. Returns `None` (Unknown) if the id is out of
/// range; inputs are always valid trits by the type system, so only the
/// id can be invalid here.
pub fn eval_dyadic(table: &GateTable, id: u32, a: Trit, b: Trit) -> Option<Trit> {
    let row = table.dyadic_row(id)?;
    Some(row[well_known::pair_index(a, b)])
}

/// Evaluate a monadic gate.
pub fn eval_monadic(table: &GateTable, id: u32, a: Trit) -> Option<Trit> {
    let row = table.monadic_row(id)?;
    let index = (a.to_i8() + 1) as usize;
    Some(row[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_is_unknown() {
        let table = GateTable::standard();
        assert_eq!(eval_dyadic(table, 19_683, Trit::Zero, Trit::Zero), None);
        assert_eq!(eval_monadic(table, 27, Trit::Zero), None);
    }

    #[test]
    fn kleene_and_matches_spec_scenario() {
        let table = GateTable::standard();
        assert_eq!(
            eval_dyadic(table, well_known::KLEENE_AND, Trit::Positive, Trit::Positive),
            Some(Trit::Positive)
        );
        assert_eq!(
            eval_dyadic(table, well_known::KLEENE_AND, Trit::Positive, Trit::Negative),
            Some(Trit::Negative)
        );
        assert_eq!(
            eval_dyadic(table, well_known::KLEENE_AND, Trit::Zero, Trit::Positive),
            Some(Trit::Zero)
        );
    }

    #[test]
    fn eval_is_deterministic() {
        let table = GateTable::standard();
        for &a in &Trit::ALL {
            for &b in &Trit::ALL {
                let first = eval_dyadic(table, well_known::PLUS, a, b);
                let second = eval_dyadic(table, well_known::PLUS, a, b);
                assert_eq!(first, second);
            }
        }
    }
}
