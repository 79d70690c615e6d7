//! The 16-register T3-ISA file.
//!
//! General-purpose and ALU-result registers (`R0..R7`, `CR`, `ACC`, `TMP`)
//! are constrained to `{-1,0,1}` by every op that writes them. `PC`/`SP`/
//! `FP`/`LR` hold plain memory addresses and need the extra range `i32`
//! provides over a single trit. `ZERO` always reads `0`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const REGISTER_COUNT: usize = 16;

pub const REG_R0: u8 = 0;
pub const REG_R1: u8 = 1;
pub const REG_R2: u8 = 2;
pub const REG_R3: u8 = 3;
pub const REG_R4: u8 = 4;
pub const REG_R5: u8 = 5;
pub const REG_R6: u8 = 6;
pub const REG_R7: u8 = 7;
pub const REG_PC: u8 = 8;
pub const REG_SP: u8 = 9;
pub const REG_FP: u8 = 10;
pub const REG_LR: u8 = 11;
pub const REG_CR: u8 = 12;
pub const REG_ACC: u8 = 13;
pub const REG_TMP: u8 = 14;
pub const REG_ZERO: u8 = 15;

#[derive(Debug, Clone, Error)]
#[error("register index {0} is out of the [0,16) range")]
pub struct InvalidRegister(pub u8);

/// The T3-ISA register file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    slots: [i32; REGISTER_COUNT],
}

impl Registers {
    pub fn new() -> Self {
        Self {
            slots: [0; REGISTER_COUNT],
        }
    }

    pub fn reset(&mut self) {
        self.slots = [0; REGISTER_COUNT];
    }

    pub fn get(&self, index: u8) -> Result<i32, InvalidRegister> {
        if index == REG_ZERO {
            return Ok(0);
        }
        self.slots
            .get(index as usize)
            .copied()
            .ok_or(InvalidRegister(index))
    }

    pub fn set(&mut self, index: u8, value: i32) -> Result<(), InvalidRegister> {
        if index == REG_ZERO {
            return Ok(()); // writes to ZERO are accepted and discarded
        }
        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(InvalidRegister(index))?;
        *slot = value;
        Ok(())
    }

    pub fn pc(&self) -> i32 {
        self.slots[REG_PC as usize]
    }

    pub fn set_pc(&mut self, value: i32) {
        self.slots[REG_PC as usize] = value;
    }

    pub fn advance_pc(&mut self) {
        self.slots[REG_PC as usize] += 1;
    }

    pub fn sp(&self) -> i32 {
        self.slots[REG_SP as usize]
    }

    pub fn set_sp(&mut self, value: i32) {
        self.slots[REG_SP as usize] = value;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_register_always_reads_zero() {
        let mut regs = Registers::new();
        regs.set(REG_ZERO, 42).unwrap();
        assert_eq!(regs.get(REG_ZERO).unwrap(), 0);
    }

    #[test]
    fn general_purpose_round_trips() {
        let mut regs = Registers::new();
        regs.set(REG_R3, -1).unwrap();
        assert_eq!(regs.get(REG_R3).unwrap(), -1);
    }

    #[test]
    fn pc_helpers_advance() {
        let mut regs = Registers::new();
        regs.set_pc(10);
        regs.advance_pc();
        assert_eq!(regs.pc(), 11);
    }

    #[test]
    fn out_of_range_index_errors() {
        let regs = Registers::new();
        assert!(regs.get(16).is_err());
    }
}
