//! The persisted, wire-compatible bytecode file format: instructions
//! concatenated with no header and no padding, size always a multiple
//! of 6 bytes.

use thiserror::Error;

use crate::tvm::instruction::{decode, encode, DecodeError, Instruction, INSTRUCTION_BYTES};

#[derive(Debug, Clone, Error)]
pub enum BytecodeError {
    #[error("bytecode length {0} is not a multiple of {INSTRUCTION_BYTES}")]
    Misaligned(usize),
    #[error("decode error at instruction {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },
}

/// Serialize a program to its flat wire form.
pub fn write(program: &[Instruction]) -> Vec<u8> {
    program.iter().flat_map(encode).collect()
}

/// Parse a flat wire buffer back into instructions.
pub fn read(bytes: &[u8]) -> Result<Vec<Instruction>, BytecodeError> {
    if bytes.len() % INSTRUCTION_BYTES != 0 {
        return Err(BytecodeError::Misaligned(bytes.len()));
    }
    bytes
        .chunks_exact(INSTRUCTION_BYTES)
        .enumerate()
        .map(|(index, chunk)| {
            decode(chunk.try_into().expect("chunks_exact yields INSTRUCTION_BYTES"))
                .map_err(|source| BytecodeError::Decode { index, source })
        })
        .collect()
}
