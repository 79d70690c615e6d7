//! Capture-avoiding substitution `M[x := N]`.
//!
//! Binder ids aren't guaranteed globally unique at construction time, so
//! every abstraction case checks whether the binder would capture a free
//! variable of `N` and α-renames on entry when it would.

use std::collections::HashSet;

use super::pool::{Pool, TermId};
use super::term::Term;

/// `term[x := replacement]`. Returns a fresh `TermId`; the caller retains
/// ownership of its original `term` and `replacement` handles (this
/// function does not release them).
pub fn substitute(pool: &mut Pool, term: TermId, x: i32, replacement: TermId) -> TermId {
    match pool.get(term).clone() {
        Term::Variable(v) => {
            if v == x {
                pool.retain(replacement)
            } else {
                pool.retain(term)
            }
        }
        Term::Abstraction { var_id, body } => {
            if var_id == x {
                return pool.retain(term); // x is shadowed
            }
            if free_vars(pool, replacement).contains(&var_id) {
                let fresh = fresh_id(pool, body, replacement, x);
                let fresh_var = pool.alloc(Term::Variable(fresh));
                let renamed_body = substitute(pool, body, var_id, fresh_var);
                pool.release(fresh_var);
                let new_body = substitute(pool, renamed_body, x, replacement);
                pool.release(renamed_body);
                pool.alloc(Term::abstraction(fresh, new_body))
            } else {
                let new_body = substitute(pool, body, x, replacement);
                pool.alloc(Term::abstraction(var_id, new_body))
            }
        }
        Term::Application { function, argument } => {
            let new_function = substitute(pool, function, x, replacement);
            let new_argument = substitute(pool, argument, x, replacement);
            pool.alloc(Term::application(new_function, new_argument))
        }
    }
}

/// The set of free variable ids occurring in the term rooted at `id`.
pub fn free_vars(pool: &Pool, id: TermId) -> HashSet<i32> {
    fn go(pool: &Pool, id: TermId, out: &mut HashSet<i32>) {
        match pool.get(id) {
            Term::Variable(v) => {
                out.insert(*v);
            }
            Term::Abstraction { var_id, body } => {
                let mut inner = HashSet::new();
                go(pool, *body, &mut inner);
                inner.remove(var_id);
                out.extend(inner);
            }
            Term::Application { function, argument } => {
                go(pool, *function, out);
                go(pool, *argument, out);
            }
        }
    }
    let mut out = HashSet::new();
    go(pool, id, &mut out);
    out
}

/// All variable ids appearing anywhere (bound or free) in the term
/// rooted at `id`.
fn all_ids(pool: &Pool, id: TermId, out: &mut HashSet<i32>) {
    match pool.get(id) {
        Term::Variable(v) => {
            out.insert(*v);
        }
        Term::Abstraction { var_id, body } => {
            out.insert(*var_id);
            all_ids(pool, *body, out);
        }
        Term::Application { function, argument } => {
            all_ids(pool, *function, out);
            all_ids(pool, *argument, out);
        }
    }
}

/// Pick a variable id not used anywhere in `body`, `replacement`, or
/// equal to `avoid`.
fn fresh_id(pool: &Pool, body: TermId, replacement: TermId, avoid: i32) -> i32 {
    let mut used = HashSet::new();
    all_ids(pool, body, &mut used);
    all_ids(pool, replacement, &mut used);
    used.insert(avoid);
    used.into_iter().max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substituting_a_matching_free_variable_yields_the_replacement() {
        let mut pool = Pool::new(16);
        let var_x = pool.alloc(Term::Variable(0));
        let replacement = pool.alloc(Term::Variable(99));

        let result = substitute(&mut pool, var_x, 0, replacement);
        assert_eq!(*pool.get(result), Term::Variable(99));
    }

    #[test]
    fn shadowed_binder_is_left_untouched() {
        let mut pool = Pool::new(16);
        let body = pool.alloc(Term::Variable(0));
        let abs = pool.alloc(Term::abstraction(0, body)); // lambda x0. x0
        let replacement = pool.alloc(Term::Variable(7));

        let result = substitute(&mut pool, abs, 0, replacement);
        assert!(is_alpha_equivalent_to_original(&pool, abs, result));
    }

    fn is_alpha_equivalent_to_original(pool: &Pool, a: TermId, b: TermId) -> bool {
        crate::lambda::alpha::is_alpha_equivalent(pool, a, b)
    }

    #[test]
    fn capture_is_avoided_by_alpha_renaming() {
        // (lambda y. x) [x := y]  must NOT become (lambda y. y)
        let mut pool = Pool::new(16);
        let x = 0;
        let y_binder = 1;
        let free_x_in_body = pool.alloc(Term::Variable(x));
        let abs = pool.alloc(Term::abstraction(y_binder, free_x_in_body)); // lambda y. x
        let replacement = pool.alloc(Term::Variable(y_binder)); // N = y

        let result = substitute(&mut pool, abs, x, replacement);
        match pool.get(result) {
            Term::Abstraction { var_id, body } => {
                assert_ne!(*var_id, y_binder, "binder must be renamed to avoid capturing y");
                match pool.get(*body) {
                    Term::Variable(v) => assert_eq!(*v, y_binder, "body should still reference y"),
                    other => panic!("expected a variable body, got {other:?}"),
                }
            }
            other => panic!("expected an abstraction, got {other:?}"),
        }
    }
}
