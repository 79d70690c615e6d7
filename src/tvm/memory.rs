//! TVM memory: a flat array of trits, configurable up to 65,536 cells.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trit::Trit;

pub const MAX_MEMORY_SIZE: usize = 65_536;
pub const DEFAULT_MEMORY_SIZE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory address {address} out of range (0..{size})")]
    AddressOutOfRange { address: i32, size: usize },
    #[error("requested memory size {0} exceeds the {MAX_MEMORY_SIZE}-cell ceiling")]
    SizeTooLarge(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<Trit>,
}

impl Memory {
    /// Create memory of the given size (clamped only by the error it
    /// returns, never silently truncated).
    pub fn new(size: usize) -> Result<Self, MemoryError> {
        if size > MAX_MEMORY_SIZE {
            return Err(MemoryError::SizeTooLarge(size));
        }
        Ok(Self {
            cells: vec![Trit::Zero; size],
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells, low address first.
    pub fn cells(&self) -> &[Trit] {
        &self.cells
    }

    pub fn read(&self, address: i32) -> Result<Trit, MemoryError> {
        self.index(address).map(|i| self.cells[i])
    }

    pub fn write(&mut self, address: i32, value: Trit) -> Result<(), MemoryError> {
        let index = self.index(address)?;
        self.cells[index] = value;
        Ok(())
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Trit::Zero;
        }
    }

    pub fn load_program(&mut self, start: usize, trits: &[Trit]) -> Result<(), MemoryError> {
        let end = start + trits.len();
        if end > self.cells.len() {
            return Err(MemoryError::AddressOutOfRange {
                address: end as i32,
                size: self.cells.len(),
            });
        }
        self.cells[start..end].copy_from_slice(trits);
        Ok(())
    }

    fn index(&self, address: i32) -> Result<usize, MemoryError> {
        if address < 0 || address as usize >= self.cells.len() {
            return Err(MemoryError::AddressOutOfRange {
                address,
                size: self.cells.len(),
            });
        }
        Ok(address as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_round_trips() {
        let mut mem = Memory::new(16).unwrap();
        mem.write(4, Trit::Positive).unwrap();
        assert_eq!(mem.read(4).unwrap(), Trit::Positive);
    }

    #[test]
    fn out_of_range_address_errors() {
        let mem = Memory::new(16).unwrap();
        assert!(mem.read(16).is_err());
        assert!(mem.read(-1).is_err());
    }

    #[test]
    fn rejects_oversized_memory() {
        assert!(Memory::new(MAX_MEMORY_SIZE + 1).is_err());
    }
}
