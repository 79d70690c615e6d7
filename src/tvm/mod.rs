//! The Ternary Virtual Machine: registers, memory, instruction cache,
//! branch predictor, and the fetch-decode-execute loop.

pub mod branch;
pub mod engine;
pub mod icache;
pub mod instruction;
pub mod memory;
pub mod registers;

pub use branch::BranchPredictor;
pub use engine::{Counters, Tvm, TvmError, TvmState};
pub use icache::ICache;
pub use instruction::{decode, encode, DecodeError, Instruction, Opcode, INSTRUCTION_BYTES};
pub use memory::{Memory, MemoryError, DEFAULT_MEMORY_SIZE, MAX_MEMORY_SIZE};
pub use registers::{
    InvalidRegister, Registers, REGISTER_COUNT, REG_ACC, REG_CR, REG_FP, REG_LR, REG_PC, REG_R0,
    REG_R1, REG_R2, REG_R3, REG_R4, REG_R5, REG_R6, REG_R7, REG_SP, REG_TMP, REG_ZERO,
};
