//! TUI debugger for the ternary substrate.
//!
//! Interactive terminal view over a running `Tvm`: disassembly centered
//! on `PC`, register/memory panes, i-cache and branch-predictor counters,
//! and step/run/breakpoint controls.

mod app;
mod ui;

pub use app::{run_debugger, DebuggerApp};
