//! Lambda-calculus term engine: a reference-counted term pool, α-equality,
//! capture-avoiding substitution, leftmost-outermost β-reduction, and
//! lowering reduced terms to T3 bytecode.

pub mod alpha;
pub mod compile;
pub mod pool;
pub mod reduce;
pub mod subst;
pub mod term;

pub use alpha::{is_alpha_equivalent, structural_hash};
pub use compile::{compile, CompileError};
pub use pool::{Pool, TermId};
pub use reduce::{step, to_normal_form, ReductionContext};
pub use subst::{free_vars, substitute};
pub use term::Term;

use thiserror::Error;

/// Errors surfaced by the term pool itself, as opposed to the pure
/// reduction/substitution functions (which are infallible given a valid
/// `Pool`).
#[derive(Debug, Error)]
pub enum LambdaError {
    /// The pool's backing allocator is exhausted. `Pool` is `Vec`-backed
    /// and grows past its initial capacity, so this is unreachable short
    /// of a real process OOM; the variant exists so embeddings with a
    /// hard arena limit have somewhere to report it.
    #[error("term pool allocation failed")]
    AllocationFailure,
    /// A term graph was found to contain a cycle through `TermId`s, which
    /// the pool's tree-shaped `Term` variants cannot construct through
    /// the public API but a malformed deserialization could.
    #[error("cyclic term graph detected at {0:?}")]
    CycleDetected(TermId),
}
