//! Fetch-decode-execute loop for the Ternary Virtual Machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diag::{MonotonicTickSource, TickSource};
use crate::gate::{eval_dyadic, well_known, GateTable};
use crate::trit::Trit;

use super::branch::BranchPredictor;
use super::icache::ICache;
use super::instruction::{decode, encode, DecodeError, Instruction, Opcode, INSTRUCTION_BYTES};
use super::memory::{Memory, MemoryError, DEFAULT_MEMORY_SIZE};
use super::registers::{
    InvalidRegister, Registers, REG_CR, REG_FP, REG_LR, REG_PC, REG_SP, REG_TMP, REG_ZERO,
};

#[cfg(feature = "observability")]
use tracing::trace;

const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TvmState {
    Running,
    Halted,
    Error,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub instructions_executed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub branch_predictions: u64,
    pub branch_mispredictions: u64,
}

#[derive(Debug, Error)]
pub enum TvmError {
    #[error("register error: {0}")]
    Register(#[from] InvalidRegister),
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    #[error("decode error: {0}")]
    Decode(#[from] super::instruction::DecodeError),
    #[error("division by zero")]
    DivisionByZero,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("stack overflow")]
    StackOverflow,
    #[error("RET with empty call stack")]
    RetWithEmptyCallStack,
    #[error("call target {0} is out of range")]
    InvalidCallTarget(i32),
    #[error("the machine is not running (state = {0:?})")]
    NotRunning(TvmState),
}

/// Owns all architectural state: registers, data memory, a separate
/// instruction store, the i-cache, and the branch predictor.
#[derive(Clone)]
pub struct Tvm {
    pub registers: Registers,
    pub memory: Memory,
    code: Vec<[u8; INSTRUCTION_BYTES]>,
    icache: ICache,
    branch_predictor: BranchPredictor,
    call_stack: Vec<i32>,
    pub state: TvmState,
    pub counters: Counters,
    gate_table: &'static GateTable,
    tick_source: Box<dyn TickSource>,
}

impl Tvm {
    pub fn new(memory_size: usize) -> Result<Self, MemoryError> {
        Self::with_capacities(memory_size, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacities(
        memory_size: usize,
        icache_capacity: usize,
        branch_predictor_capacity: usize,
    ) -> Result<Self, MemoryError> {
        let memory = Memory::new(memory_size)?;
        let mut registers = Registers::new();
        registers.set_sp(memory_size as i32 - 1);
        Ok(Self {
            registers,
            memory,
            code: vec![[Opcode::Nop as u8, 0, 0, 0, 0, 0]; memory_size],
            icache: ICache::new(icache_capacity),
            branch_predictor: BranchPredictor::new(branch_predictor_capacity),
            call_stack: Vec::new(),
            state: TvmState::Running,
            counters: Counters::default(),
            gate_table: GateTable::standard(),
            tick_source: Box::new(MonotonicTickSource::new()),
        })
    }

    /// Load a program into the code store starting at slot 0.
    pub fn load_program(&mut self, program: &[Instruction]) -> Result<(), TvmError> {
        if program.len() > self.code.len() {
            return Err(TvmError::InvalidCallTarget(program.len() as i32));
        }
        for (i, instr) in program.iter().enumerate() {
            self.patch_instruction(i as i32, *instr)?;
        }
        Ok(())
    }

    /// Number of instruction slots in the code store.
    pub fn code_len(&self) -> usize {
        self.code.len()
    }

    /// Decode the instruction at `address` without touching the i-cache
    /// or counters. For disassembly/debugger display, not the fetch path.
    pub fn instruction_at(&self, address: i32) -> Option<Instruction> {
        self.code.get(address as usize).and_then(|bytes| decode(bytes).ok())
    }

    /// Decode a flat buffer of 6-byte instruction words (as produced by
    /// [`crate::lambda::compile::compile`] or the assembler) and load it.
    pub fn load_program_bytes(&mut self, bytes: &[u8]) -> Result<(), TvmError> {
        if bytes.len() % INSTRUCTION_BYTES != 0 {
            return Err(TvmError::Decode(DecodeError::WrongLength(bytes.len())));
        }
        let program: Result<Vec<Instruction>, DecodeError> = bytes
            .chunks_exact(INSTRUCTION_BYTES)
            .map(|chunk| decode(chunk.try_into().expect("chunks_exact yields INSTRUCTION_BYTES")))
            .collect();
        self.load_program(&program?)
    }

    /// Overwrite a single code slot, invalidating any cached decode.
    pub fn patch_instruction(&mut self, address: i32, instr: Instruction) -> Result<(), TvmError> {
        let slot = self
            .code
            .get_mut(address as usize)
            .ok_or(TvmError::InvalidCallTarget(address))?;
        *slot = encode(&instr);
        self.icache.invalidate(address);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.registers.reset();
        self.registers.set_sp(self.memory.len() as i32 - 1);
        self.memory.clear();
        self.call_stack.clear();
        self.state = TvmState::Running;
        self.counters = Counters::default();
    }

    /// Run until halted or errored, or `max_steps` is reached (0 = no limit).
    pub fn run(&mut self, max_steps: u64) -> Result<u64, TvmError> {
        let mut steps = 0u64;
        while self.state == TvmState::Running {
            if max_steps != 0 && steps >= max_steps {
                break;
            }
            self.step()?;
            steps += 1;
        }
        Ok(steps)
    }

    /// Execute exactly one instruction.
    pub fn step(&mut self) -> Result<Instruction, TvmError> {
        if self.state != TvmState::Running {
            return Err(TvmError::NotRunning(self.state));
        }

        let pc = self.registers.pc();
        let (instruction, hit) = self.icache.lookup(pc, &self.code)?;
        if hit {
            self.counters.cache_hits += 1;
        } else {
            self.counters.cache_misses += 1;
        }

        #[cfg(feature = "observability")]
        trace!(pc, opcode = ?instruction.opcode, "tvm step");

        let wrote_pc = self.execute(instruction)?;
        if !wrote_pc {
            self.registers.advance_pc();
        }
        self.counters.instructions_executed += 1;
        Ok(instruction)
    }

    /// Execute one decoded instruction. Returns whether PC was written by
    /// the instruction itself (suppressing the automatic +1 advance).
    fn execute(&mut self, instr: Instruction) -> Result<bool, TvmError> {
        use Opcode::*;

        match instr.opcode {
            Load => {
                let value = self.memory.read(instr.immediate as i32)?;
                self.registers.set(instr.op1, value.to_i8() as i32)?;
                Ok(false)
            }
            Store => {
                let value = self.read_trit(instr.op1)?;
                self.memory.write(instr.immediate as i32, value)?;
                Ok(false)
            }
            Mov => {
                // `op2 == ZERO` signals the immediate-load form (`MOV Rd,
                // #imm`): registers hold single trits, so the payload is
                // the sign of `immediate`, not its magnitude.
                let value = if instr.op2 == REG_ZERO {
                    Trit::from_i8(instr.immediate.signum() as i8)
                        .expect("signum is in range by construction")
                        .to_i8() as i32
                } else {
                    self.registers.get(instr.op2)?
                };
                self.registers.set(instr.op1, value)?;
                Ok(false)
            }
            Add => self.alu_trit(instr, |a, b| a.add_with_carry(b, Trit::Zero).0),
            Sub => self.alu_trit(instr, |a, b| a.add_with_carry(b.negate(), Trit::Zero).0),
            Mul => self.alu_trit(instr, Trit::mul),
            Div => {
                let a = self.read_trit(instr.op2)?;
                let b = self.read_trit(instr.op3)?;
                if b.is_zero() {
                    self.fault();
                    return Err(TvmError::DivisionByZero);
                }
                self.write_trit(instr.op1, a.mul(b))?;
                Ok(false)
            }
            And => self.gate_op(instr, well_known::KLEENE_AND),
            Or => self.gate_op(instr, well_known::KLEENE_OR),
            Xor => self.gate_op(instr, well_known::XOR),
            Not => {
                let value = self.read_trit(instr.op2)?;
                self.write_trit(instr.op1, value.negate())?;
                Ok(false)
            }
            Cmp => {
                let a = self.registers.get(instr.op2)?;
                let b = self.registers.get(instr.op3)?;
                let sign = (a - b).signum() as i8;
                let trit = Trit::from_i8(sign).expect("signum is in {-1,0,1}");
                self.write_trit(instr.op1, trit)?;
                Ok(false)
            }
            Jmp => {
                self.registers.set_pc(instr.immediate as i32);
                Ok(true)
            }
            Jz => self.conditional_jump(instr, |v| v == 0),
            Jnz => self.conditional_jump(instr, |v| v != 0),
            Call => {
                let target = instr.immediate as i32;
                if target < 0 || target as usize >= self.code.len() {
                    self.fault();
                    return Err(TvmError::InvalidCallTarget(target));
                }
                self.call_stack.push(self.registers.pc() + 1);
                self.registers.set_pc(target);
                Ok(true)
            }
            Ret => {
                let target = self.call_stack.pop().ok_or_else(|| {
                    self.fault();
                    TvmError::RetWithEmptyCallStack
                })?;
                self.registers.set_pc(target);
                Ok(true)
            }
            Push => {
                let value = self.read_trit(instr.op1)?;
                let sp = self.registers.sp();
                if sp <= 0 {
                    self.fault();
                    return Err(TvmError::StackOverflow);
                }
                self.memory.write(sp, value)?;
                self.registers.set_sp(sp - 1);
                Ok(false)
            }
            Pop => {
                let sp = self.registers.sp() + 1;
                if sp as usize >= self.memory.len() {
                    self.fault();
                    return Err(TvmError::StackUnderflow);
                }
                self.registers.set_sp(sp);
                let value = self.memory.read(sp)?;
                self.write_trit(instr.op1, value)?;
                Ok(false)
            }
            Halt => {
                self.state = TvmState::Halted;
                Ok(false)
            }
            Nop => Ok(false),
            Syscall | Iret | Cli | Sti | Int => Ok(false), // no hosted OS; defined as no-ops
            Cpuid => {
                self.write_trit(instr.op1, Trit::Positive)?;
                Ok(false)
            }
            Rdtsc => {
                // A single trit can't hold a tick count; reading a nonzero
                // tick stands in for "time strictly advances".
                let value = if self.tick_source.ticks() > 0 {
                    Trit::Positive
                } else {
                    Trit::Zero
                };
                self.registers.set(REG_TMP, value.to_i8() as i32)?;
                Ok(false)
            }
            Lea => {
                if !matches!(instr.op1, REG_PC | REG_SP | REG_FP | REG_LR) {
                    return Err(TvmError::Register(InvalidRegister(instr.op1)));
                }
                self.registers.set(instr.op1, instr.immediate as i32)?;
                Ok(false)
            }
            Tst => {
                let value = self.read_trit(instr.op2)?;
                self.registers.set(REG_CR, value.to_i8() as i32)?;
                Ok(false)
            }
            Tgate => {
                let a = self.read_trit(instr.op2)?;
                let b = self.read_trit(instr.op3)?;
                let gate_id = instr.immediate as u16 as u32;
                let result = eval_dyadic(self.gate_table, gate_id, a, b).unwrap_or(Trit::Zero);
                self.write_trit(instr.op1, result)?;
                Ok(false)
            }
        }
    }

    fn alu_trit(&mut self, instr: Instruction, f: impl Fn(Trit, Trit) -> Trit) -> Result<bool, TvmError> {
        let a = self.read_trit(instr.op2)?;
        let b = self.read_trit(instr.op3)?;
        self.write_trit(instr.op1, f(a, b))?;
        Ok(false)
    }

    fn gate_op(&mut self, instr: Instruction, gate_id: u32) -> Result<bool, TvmError> {
        let a = self.read_trit(instr.op2)?;
        let b = self.read_trit(instr.op3)?;
        let result = eval_dyadic(self.gate_table, gate_id, a, b).unwrap_or(Trit::Zero);
        self.write_trit(instr.op1, result)?;
        Ok(false)
    }

    fn conditional_jump(&mut self, instr: Instruction, predicate: impl Fn(i32) -> bool) -> Result<bool, TvmError> {
        let pc = self.registers.pc();
        self.counters.branch_predictions += 1;
        let predicted_taken = self.branch_predictor.predict(pc);

        let value = self.registers.get(instr.op1)?;
        let taken = predicate(value);
        if taken != predicted_taken {
            self.counters.branch_mispredictions += 1;
        }
        self.branch_predictor.resolve(pc, taken);

        if taken {
            self.registers.set_pc(instr.immediate as i32);
        }
        Ok(taken)
    }

    fn read_trit(&self, register: u8) -> Result<Trit, TvmError> {
        let raw = self.registers.get(register)?;
        Ok(Trit::from_i8(raw as i8).unwrap_or(Trit::Zero))
    }

    fn write_trit(&mut self, register: u8, value: Trit) -> Result<(), TvmError> {
        self.registers.set(register, value.to_i8() as i32)?;
        Ok(())
    }

    fn fault(&mut self) {
        self.state = TvmState::Error;
    }
}

impl Default for Tvm {
    fn default() -> Self {
        Tvm::new(DEFAULT_MEMORY_SIZE).expect("default memory size is within bounds")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvm::registers::{REG_R0, REG_R1, REG_R2};

    fn instr(opcode: Opcode, op1: u8, op2: u8, op3: u8, immediate: i16) -> Instruction {
        Instruction::new(opcode, op1, op2, op3, immediate)
    }

    #[test]
    fn scenario_load_add_halt() {
        let mut tvm = Tvm::new(64).unwrap();
        tvm.memory.write(1, Trit::Positive).unwrap();
        let program = [
            instr(Opcode::Load, REG_R0, 0, 0, 1),
            instr(Opcode::Load, REG_R1, 0, 0, 1),
            instr(Opcode::Add, REG_R2, REG_R0, REG_R1, 0),
            instr(Opcode::Halt, 0, 0, 0, 0),
        ];
        tvm.load_program(&program).unwrap();
        tvm.run(0).unwrap();

        assert_eq!(tvm.state, TvmState::Halted);
        // +1 + +1 = sum 2 -> add_with_carry maps +2 -> (-1, +1), carry discarded.
        assert_eq!(tvm.registers.get(REG_R2).unwrap(), -1);
    }

    #[test]
    fn division_by_zero_halts_with_error() {
        let mut tvm = Tvm::new(16).unwrap();
        let program = [instr(Opcode::Div, REG_R0, REG_R1, REG_R2, 0)];
        tvm.load_program(&program).unwrap();
        let result = tvm.step();
        assert!(result.is_err());
        assert_eq!(tvm.state, TvmState::Error);
    }

    #[test]
    fn push_at_sp_below_zero_overflows() {
        let mut tvm = Tvm::new(16).unwrap();
        tvm.registers.set_sp(-1);
        let program = [instr(Opcode::Push, REG_R0, 0, 0, 0)];
        tvm.load_program(&program).unwrap();
        let result = tvm.step();
        assert!(matches!(result, Err(TvmError::StackOverflow)));
    }

    #[test]
    fn push_at_sp_zero_overflows_without_writing() {
        let mut tvm = Tvm::new(16).unwrap();
        tvm.registers.set_sp(0);
        let program = [instr(Opcode::Push, REG_R0, 0, 0, 0)];
        tvm.load_program(&program).unwrap();
        let result = tvm.step();
        assert!(matches!(result, Err(TvmError::StackOverflow)));
        assert_eq!(tvm.state, TvmState::Error);
        assert_eq!(tvm.memory.read(0).unwrap(), Trit::Zero);
    }

    #[test]
    fn ret_with_empty_call_stack_errors() {
        let mut tvm = Tvm::new(16).unwrap();
        let program = [instr(Opcode::Ret, 0, 0, 0, 0)];
        tvm.load_program(&program).unwrap();
        assert!(matches!(tvm.step(), Err(TvmError::RetWithEmptyCallStack)));
    }

    #[test]
    fn call_into_out_of_range_address_errors() {
        let mut tvm = Tvm::new(16).unwrap();
        let program = [instr(Opcode::Call, 0, 0, 0, 1000)];
        tvm.load_program(&program).unwrap();
        assert!(matches!(tvm.step(), Err(TvmError::InvalidCallTarget(1000))));
    }

    #[test]
    fn kleene_and_via_and_opcode() {
        let mut tvm = Tvm::new(16).unwrap();
        tvm.registers.set(REG_R0, 1).unwrap();
        tvm.registers.set(REG_R1, -1).unwrap();
        let program = [instr(Opcode::And, REG_R2, REG_R0, REG_R1, 0)];
        tvm.load_program(&program).unwrap();
        tvm.step().unwrap();
        assert_eq!(tvm.registers.get(REG_R2).unwrap(), -1);
    }

    #[test]
    fn icache_warm_and_cold_produce_identical_state() {
        let program = [
            instr(Opcode::Load, REG_R0, 0, 0, 1),
            instr(Opcode::Jmp, 0, 0, 0, 2),
            instr(Opcode::Nop, 0, 0, 0, 0),
            instr(Opcode::Halt, 0, 0, 0, 0),
        ];

        let mut cold = Tvm::new(16).unwrap();
        cold.memory.write(1, Trit::Positive).unwrap();
        cold.load_program(&program).unwrap();
        cold.run(0).unwrap();

        let mut warm = Tvm::with_capacities(16, 1, 1).unwrap();
        warm.memory.write(1, Trit::Positive).unwrap();
        warm.load_program(&program).unwrap();
        warm.run(0).unwrap();

        assert_eq!(cold.registers, warm.registers);
    }
}
