//! # Ternary Substrate
//!
//! A balanced ternary computing substrate: trit/trit-array arithmetic, a
//! ternary gate evaluator, a register-based Ternary Virtual Machine
//! (T3-ISA), and a lambda-calculus term engine that lowers reduced terms
//! to T3 bytecode.

pub mod asm;
pub mod diag;
pub mod gate;
pub mod lambda;
pub mod trit;
pub mod tvm;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use asm::{assemble, disassemble, AssemblerError};
pub use diag::{DiagSink, MonotonicTickSource, StdoutSink, TickSource};
pub use gate::{eval_dyadic, eval_monadic, well_known, GateTable};
pub use lambda::{compile, CompileError, Pool, Term, TermId};
pub use trit::{Trit, TritArray, TritError, TritOps};
pub use tvm::{Instruction, Tvm, TvmError, TvmState};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
