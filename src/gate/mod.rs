//! Ternary gate evaluation: dyadic/monadic lookup tables, evaluation,
//! algebraic-property derivation, and the persisted binary layout.

pub mod analysis;
pub mod eval;
pub mod io;
pub mod tables;

pub use analysis::{derive, truth_table, PostClass, Properties};
pub use eval::{eval_dyadic, eval_monadic};
pub use io::GateIoError;
pub use tables::{well_known, GateTable, DYADIC_GATE_COUNT, MONADIC_GATE_COUNT};

use thiserror::Error;

/// Errors surfaced by gate-facing operations outside the pure table
/// lookups (those use `Option` to propagate an out-of-range gate id).
#[derive(Debug, Error)]
pub enum GateError {
    #[error("gate id {0} is out of range")]
    InvalidGateId(u32),
    #[error("table entry at index {0} holds an invalid trit value {1}")]
    InvalidTableEntry(usize, i8),
}
