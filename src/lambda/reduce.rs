//! Leftmost-outermost β-reduction, single-step and to-normal-form.

use serde::{Deserialize, Serialize};

use super::pool::{Pool, TermId};
use super::subst::substitute;
use super::term::Term;

#[cfg(feature = "observability")]
use tracing::trace;

/// Per-invocation reduction bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionContext {
    pub step_count: u64,
    pub max_steps: u64,
    pub depth: u32,
    pub max_depth: u32,
    pub timeout: bool,
}

impl ReductionContext {
    pub fn new(max_steps: u64, max_depth: u32) -> Self {
        Self {
            step_count: 0,
            max_steps,
            depth: 0,
            max_depth,
            timeout: false,
        }
    }
}

/// One leftmost-outermost rewrite step. Returns `None` if `term` is
/// already in normal form (no redex anywhere). Does not release `term`;
/// the caller owns both the input and (if `Some`) the returned handle.
pub fn step(pool: &mut Pool, term: TermId) -> Option<TermId> {
    match pool.get(term).clone() {
        Term::Variable(_) => None,
        Term::Abstraction { var_id, body } => {
            let reduced_body = step(pool, body)?;
            Some(pool.alloc(Term::abstraction(var_id, reduced_body)))
        }
        Term::Application { function, argument } => {
            if let Term::Abstraction { var_id, body } = pool.get(function).clone() {
                return Some(substitute(pool, body, var_id, argument));
            }

            if let Some(reduced_fn) = step(pool, function) {
                if let Term::Abstraction { var_id, body } = pool.get(reduced_fn).clone() {
                    let result = substitute(pool, body, var_id, argument);
                    pool.release(reduced_fn);
                    return Some(result);
                }
                let argument = pool.retain(argument);
                return Some(pool.alloc(Term::application(reduced_fn, argument)));
            }

            let reduced_arg = step(pool, argument)?;
            let function = pool.retain(function);
            Some(pool.alloc(Term::application(function, reduced_arg)))
        }
    }
}

/// The AST depth of the term rooted at `id`.
fn term_depth(pool: &Pool, id: TermId) -> u32 {
    match pool.get(id) {
        Term::Variable(_) => 1,
        Term::Abstraction { body, .. } => 1 + term_depth(pool, *body),
        Term::Application { function, argument } => {
            1 + term_depth(pool, *function).max(term_depth(pool, *argument))
        }
    }
}

/// Repeatedly apply [`step`] until no redex remains or `ctx` times out.
/// Consumes `term`, returning a freshly-owned handle to the result;
/// every intermediate term is released along the way.
pub fn to_normal_form(pool: &mut Pool, term: TermId, ctx: &mut ReductionContext) -> TermId {
    let mut current = term;
    loop {
        ctx.depth = term_depth(pool, current);
        if ctx.step_count >= ctx.max_steps || ctx.depth > ctx.max_depth {
            ctx.timeout = true;
            break;
        }
        ctx.step_count += 1;

        match step(pool, current) {
            Some(next) => {
                #[cfg(feature = "observability")]
                trace!(step = ctx.step_count, depth = ctx.depth, "beta reduction step");
                pool.release(current);
                current = next;
            }
            None => break,
        }
    }
    current
}
