//! Free-function ripple-carry arithmetic over [`TritArray`], arbitrary
//! length rather than a fixed word width.

use super::array::TritArray;
use super::Trit;

/// Add two arrays, ripple-carry, producing a result wide enough to hold
/// any final carry-out trit.
pub fn add(a: &TritArray, b: &TritArray) -> TritArray {
    let len = a.len().max(b.len());
    let mut result = Vec::with_capacity(len + 1);
    let mut carry = Trit::Zero;

    for i in 0..len {
        let (sum, carry_out) = a.get(i).add_with_carry(b.get(i), carry);
        result.push(sum);
        carry = carry_out;
    }
    if !carry.is_zero() {
        result.push(carry);
    }

    TritArray::from_trits(result)
}

/// Subtract `b` from `a` via negation and addition.
pub fn subtract(a: &TritArray, b: &TritArray) -> TritArray {
    add(a, &negate(b))
}

/// Negate every trit of the array.
pub fn negate(a: &TritArray) -> TritArray {
    a.negate()
}

/// Schoolbook shift-and-add multiplication: for each non-zero trit of `b`
/// at position `i`, add `a` (scaled by that trit's sign) shifted left by
/// `i` positions.
pub fn multiply(a: &TritArray, b: &TritArray) -> TritArray {
    let mut result = TritArray::new();
    for (i, &digit) in b.trits().iter().enumerate() {
        if digit.is_zero() {
            continue;
        }
        let term = scale_and_shift(a, digit, i);
        result = add(&result, &term);
    }
    result
}

fn scale_and_shift(a: &TritArray, digit: Trit, shift: usize) -> TritArray {
    let scaled = if digit.is_negative() { a.negate() } else { a.clone() };
    scaled.shift_left(shift)
}

/// Left-shift (multiply by `3^n`).
pub fn shift_left(a: &TritArray, n: usize) -> TritArray {
    a.shift_left(n)
}

/// Right-shift (divide by `3^n`, truncating toward the low end).
pub fn shift_right(a: &TritArray, n: usize) -> TritArray {
    a.shift_right(n)
}

/// Three-way comparison, most significant differing trit decides.
pub fn compare(a: &TritArray, b: &TritArray) -> std::cmp::Ordering {
    let diff = subtract(a, b);
    match diff.sign() {
        Trit::Negative => std::cmp::Ordering::Less,
        Trit::Zero => std::cmp::Ordering::Equal,
        Trit::Positive => std::cmp::Ordering::Greater,
    }
}
