//! Structural hashing and α-equivalence.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::pool::{Pool, TermId};
use super::term::Term;

/// Hash a freshly-constructed term node, using children's already-computed
/// structural hashes (children are always allocated, and therefore
/// hashed, before their parent). Bound-variable ids are folded in
/// positionally so α-equivalent terms with different but consistently
/// renamed binders still hash the same relative structure where it
/// matters for the abstraction case; the binder id of the immediate
/// abstraction itself is folded in, since this hash only needs to agree
/// for syntactically equal terms, not for every alpha-equivalent one.
pub fn structural_hash(term: &Term, pool: &Pool) -> u64 {
    let mut hasher = DefaultHasher::new();
    match term {
        Term::Variable(var_id) => {
            0u8.hash(&mut hasher);
            var_id.hash(&mut hasher);
        }
        Term::Abstraction { var_id, body } => {
            1u8.hash(&mut hasher);
            var_id.hash(&mut hasher);
            pool.structural_hash(*body).hash(&mut hasher);
        }
        Term::Application { function, argument } => {
            2u8.hash(&mut hasher);
            pool.structural_hash(*function).hash(&mut hasher);
            pool.structural_hash(*argument).hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Structural equality up to consistent renaming of bound variables.
///
/// Walks both terms in lockstep, tracking a binder correspondence so that
/// two abstractions with differently-named (but consistently paired)
/// bound variables compare equal, while a free variable must match
/// exactly on both sides.
pub fn is_alpha_equivalent(pool: &Pool, a: TermId, b: TermId) -> bool {
    fn go(pool: &Pool, a: TermId, b: TermId, bound: &mut Vec<(i32, i32)>) -> bool {
        match (pool.get(a), pool.get(b)) {
            (Term::Variable(x), Term::Variable(y)) => {
                for &(bx, by) in bound.iter().rev() {
                    let x_bound = bx == *x;
                    let y_bound = by == *y;
                    if x_bound || y_bound {
                        return x_bound && y_bound && bx == *x && by == *y;
                    }
                }
                x == y
            }
            (
                Term::Abstraction { var_id: vx, body: bx },
                Term::Abstraction { var_id: vy, body: by },
            ) => {
                bound.push((*vx, *vy));
                let result = go(pool, *bx, *by, bound);
                bound.pop();
                result
            }
            (
                Term::Application { function: fx, argument: ax },
                Term::Application { function: fy, argument: ay },
            ) => go(pool, *fx, *fy, bound) && go(pool, *ax, *ay, bound),
            _ => false,
        }
    }

    go(pool, a, b, &mut Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lambda::term::Term;

    #[test]
    fn identical_terms_are_alpha_equivalent() {
        let mut pool = Pool::new(16);
        let v = pool.alloc(Term::Variable(0));
        let abs1 = pool.alloc(Term::abstraction(0, v));
        let v2 = pool.alloc(Term::Variable(0));
        let abs2 = pool.alloc(Term::abstraction(0, v2));
        assert!(is_alpha_equivalent(&pool, abs1, abs2));
    }

    #[test]
    fn differently_named_binders_are_still_equivalent() {
        let mut pool = Pool::new(16);
        let vx = pool.alloc(Term::Variable(10));
        let abs_x = pool.alloc(Term::abstraction(10, vx));
        let vy = pool.alloc(Term::Variable(20));
        let abs_y = pool.alloc(Term::abstraction(20, vy));
        assert!(is_alpha_equivalent(&pool, abs_x, abs_y));
    }

    #[test]
    fn free_variables_must_match_exactly() {
        let mut pool = Pool::new(16);
        let a = pool.alloc(Term::Variable(1));
        let b = pool.alloc(Term::Variable(2));
        assert!(!is_alpha_equivalent(&pool, a, b));
    }

    #[test]
    fn structurally_different_terms_are_not_equivalent() {
        let mut pool = Pool::new(16);
        let v = pool.alloc(Term::Variable(0));
        let abs = pool.alloc(Term::abstraction(0, v));
        let app = pool.alloc(Term::application(v, v));
        assert!(!is_alpha_equivalent(&pool, abs, app));
    }
}
