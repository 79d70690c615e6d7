//! Dyadic and monadic ternary gate lookup tables.
//!
//! A dyadic function id in `[0, 19683)` is a base-3 digit string over
//! `{-1,0,+1}` of length 9: digit `k` (for input pair index `k`, `k =
//! (a+1)*3 + (b+1)`) is the function's output for that pair. The monadic
//! table is the same scheme with 3 digits instead of 9.

use std::sync::OnceLock;

use crate::trit::Trit;

pub const DYADIC_GATE_COUNT: usize = 19_683; // 3^9
pub const MONADIC_GATE_COUNT: usize = 27; // 3^3

/// Well-known dyadic gate ids, computed from their truth tables rather than
/// hand-written magic numbers.
pub mod well_known {
    use super::*;

    /// `(a+1)*3 + (b+1)` index into a 9-cell truth table, used both to
    /// build the well-known ids below and at evaluation time.
    pub const fn pair_index(a: Trit, b: Trit) -> usize {
        ((a.to_i8() + 1) as usize) * 3 + (b.to_i8() + 1) as usize
    }

    /// Encode a 9-cell truth table (indexed by [`pair_index`]) as a
    /// mixed-radix function id.
    pub const fn encode_dyadic(cells: [Trit; 9]) -> u32 {
        let mut id: u32 = 0;
        let mut i = 9;
        while i > 0 {
            i -= 1;
            // digit value in {0,1,2} from the trit's {-1,0,1} value.
            let digit = (cells[i].to_i8() + 1) as u32;
            id = id * 3 + digit;
        }
        id
    }

    /// Build a 9-cell truth table by direct (non-function-pointer) calls to
    /// `$f`, since calling through a `fn` pointer isn't allowed in a
    /// `const fn`.
    macro_rules! table {
        ($f:ident) => {{
            let mut cells = [Trit::Zero; 9];
            let mut a_idx = 0;
            while a_idx < 3 {
                let mut b_idx = 0;
                while b_idx < 3 {
                    let a = Trit::ALL[a_idx];
                    let b = Trit::ALL[b_idx];
                    cells[pair_index(a, b)] = $f(a, b);
                    b_idx += 1;
                }
                a_idx += 1;
            }
            cells
        }};
    }

    const fn kleene_and(a: Trit, b: Trit) -> Trit {
        match (a, b) {
            (Trit::Negative, _) | (_, Trit::Negative) => Trit::Negative,
            (Trit::Zero, _) | (_, Trit::Zero) => Trit::Zero,
            (Trit::Positive, Trit::Positive) => Trit::Positive,
        }
    }

    const fn kleene_or(a: Trit, b: Trit) -> Trit {
        match (a, b) {
            (Trit::Positive, _) | (_, Trit::Positive) => Trit::Positive,
            (Trit::Zero, _) | (_, Trit::Zero) => Trit::Zero,
            (Trit::Negative, Trit::Negative) => Trit::Negative,
        }
    }

    const fn consensus(a: Trit, b: Trit) -> Trit {
        if a.to_i8() == b.to_i8() {
            a
        } else {
            Trit::Zero
        }
    }

    const fn minority(a: Trit, b: Trit) -> Trit {
        consensus(a, b).negate()
    }

    const fn plus(a: Trit, b: Trit) -> Trit {
        a.sum(b)
    }

    const fn times(a: Trit, b: Trit) -> Trit {
        a.mul(b)
    }

    const fn xor(a: Trit, b: Trit) -> Trit {
        // ternary XOR: unequal -> sign of a+b wrapped, equal -> 0
        if a.to_i8() == b.to_i8() {
            Trit::Zero
        } else {
            plus(a, b)
        }
    }

    pub const KLEENE_AND: u32 = encode_dyadic(table!(kleene_and));
    pub const KLEENE_OR: u32 = encode_dyadic(table!(kleene_or));
    pub const CONSENSUS: u32 = encode_dyadic(table!(consensus));
    pub const MINORITY: u32 = encode_dyadic(table!(minority));
    pub const PLUS: u32 = encode_dyadic(table!(plus));
    pub const TIMES: u32 = encode_dyadic(table!(times));
    pub const XOR: u32 = encode_dyadic(table!(xor));
}

/// A pair of fully materialized ternary gate lookup tables.
pub struct GateTable {
    dyadic: Vec<[Trit; 9]>,
    monadic: Vec<[Trit; 3]>,
}

impl GateTable {
    /// Build the full 19,683 x 9 + 27 x 3 table set by decoding every
    /// function id's mixed-radix digit string.
    fn build() -> Self {
        let mut dyadic = Vec::with_capacity(DYADIC_GATE_COUNT);
        for id in 0..DYADIC_GATE_COUNT {
            dyadic.push(decode_cells::<9>(id as u32));
        }

        let mut monadic = Vec::with_capacity(MONADIC_GATE_COUNT);
        for id in 0..MONADIC_GATE_COUNT {
            let cells3 = decode_cells::<3>(id as u32);
            monadic.push([cells3[0], cells3[1], cells3[2]]);
        }

        Self { dyadic, monadic }
    }

    /// The process-wide standard table set, built once.
    pub fn standard() -> &'static GateTable {
        static TABLE: OnceLock<GateTable> = OnceLock::new();
        TABLE.get_or_init(GateTable::build)
    }

    pub fn dyadic_row(&self, id: u32) -> Option<&[Trit; 9]> {
        self.dyadic.get(id as usize)
    }

    pub fn monadic_row(&self, id: u32) -> Option<&[Trit; 3]> {
        self.monadic.get(id as usize)
    }
}

/// Decode a mixed-radix function id into its `N`-cell truth table.
fn decode_cells<const N: usize>(mut id: u32) -> [Trit; N] {
    let mut cells = [Trit::Zero; N];
    for cell in cells.iter_mut() {
        let digit = (id % 3) as i8 - 1;
        *cell = Trit::from_i8(digit).expect("digit in range by construction");
        id /= 3;
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::well_known::*;
    use super::*;

    #[test]
    fn dyadic_and_monadic_counts() {
        let table = GateTable::build();
        assert_eq!(table.dyadic.len(), DYADIC_GATE_COUNT);
        assert_eq!(table.monadic.len(), MONADIC_GATE_COUNT);
    }

    #[test]
    fn kleene_and_truth_cells() {
        let table = GateTable::standard();
        let row = table.dyadic_row(KLEENE_AND).unwrap();
        assert_eq!(row[pair_index(Trit::Positive, Trit::Positive)], Trit::Positive);
        assert_eq!(row[pair_index(Trit::Positive, Trit::Negative)], Trit::Negative);
        assert_eq!(row[pair_index(Trit::Zero, Trit::Positive)], Trit::Zero);
    }

    #[test]
    fn well_known_ids_are_in_range() {
        for id in [KLEENE_AND, KLEENE_OR, CONSENSUS, MINORITY, PLUS, TIMES, XOR] {
            assert!((id as usize) < DYADIC_GATE_COUNT);
        }
    }

    #[test]
    fn standard_is_cached_across_calls() {
        let a = GateTable::standard() as *const GateTable;
        let b = GateTable::standard() as *const GateTable;
        assert_eq!(a, b);
    }
}
