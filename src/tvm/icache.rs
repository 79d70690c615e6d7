//! Direct-mapped instruction cache over the TVM's code store.

use super::instruction::{decode, DecodeError, Instruction, INSTRUCTION_BYTES};

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    address: i32,
    instruction: Option<Instruction>,
    valid: bool,
}

#[derive(Debug, Clone)]
pub struct ICache {
    entries: Vec<Entry>,
    capacity_mask: usize,
}

impl ICache {
    /// `capacity` must be a power of two.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity.is_power_of_two(), "i-cache capacity must be a power of two");
        Self {
            entries: vec![Entry::default(); capacity],
            capacity_mask: capacity - 1,
        }
    }

    fn slot(&self, address: i32) -> usize {
        (address as usize) & self.capacity_mask
    }

    /// Look up `address`, decoding from `code` on a miss. Returns the
    /// decoded instruction and whether it was a hit.
    pub fn lookup(
        &mut self,
        address: i32,
        code: &[[u8; INSTRUCTION_BYTES]],
    ) -> Result<(Instruction, bool), DecodeError> {
        let slot = self.slot(address);
        let entry = &self.entries[slot];
        if entry.valid && entry.address == address {
            return Ok((entry.instruction.expect("valid entry always has an instruction"), true));
        }

        let bytes = code
            .get(address as usize)
            .ok_or(DecodeError::OperandOutOfRange(0))?;
        let instruction = decode(bytes)?;
        self.entries[slot] = Entry {
            address,
            instruction: Some(instruction),
            valid: true,
        };
        Ok((instruction, false))
    }

    /// Invalidate the entry for `address`, if one is cached there.
    pub fn invalidate(&mut self, address: i32) {
        let slot = self.slot(address);
        if self.entries[slot].address == address {
            self.entries[slot].valid = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvm::instruction::{encode, Instruction as Instr, Opcode};

    fn code_with(instructions: &[Instr]) -> Vec<[u8; INSTRUCTION_BYTES]> {
        instructions.iter().map(encode).collect()
    }

    #[test]
    fn first_lookup_is_a_miss_second_is_a_hit() {
        let code = code_with(&[Instr::new(Opcode::Nop, 0, 0, 0, 0)]);
        let mut cache = ICache::new(4);
        let (_, hit1) = cache.lookup(0, &code).unwrap();
        let (_, hit2) = cache.lookup(0, &code).unwrap();
        assert!(!hit1);
        assert!(hit2);
    }

    #[test]
    fn invalidate_forces_a_miss_on_next_lookup() {
        let code = code_with(&[Instr::new(Opcode::Nop, 0, 0, 0, 0)]);
        let mut cache = ICache::new(4);
        cache.lookup(0, &code).unwrap();
        cache.invalidate(0);
        let (_, hit) = cache.lookup(0, &code).unwrap();
        assert!(!hit);
    }

    #[test]
    fn conflicting_addresses_evict() {
        let code = code_with(&[
            Instr::new(Opcode::Nop, 0, 0, 0, 0),
            Instr::new(Opcode::Halt, 0, 0, 0, 0),
            Instr::new(Opcode::Nop, 0, 0, 0, 0),
            Instr::new(Opcode::Nop, 0, 0, 0, 0),
            Instr::new(Opcode::Halt, 0, 0, 0, 0),
        ]);
        let mut cache = ICache::new(4); // addresses 0 and 4 collide
        cache.lookup(0, &code).unwrap();
        let (instr, hit) = cache.lookup(4, &code).unwrap();
        assert!(!hit);
        assert_eq!(instr.opcode, Opcode::Halt);
    }
}
