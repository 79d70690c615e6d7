//! WebAssembly bindings: a JavaScript-friendly wrapper around `Tvm`.

use wasm_bindgen::prelude::*;

use crate::asm::{assemble, disassemble_one};
use crate::tvm::{Instruction, Tvm};

#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly machine wrapper.
#[wasm_bindgen]
pub struct WasmTvm {
    tvm: Tvm,
    program: Vec<Instruction>,
}

#[wasm_bindgen]
impl WasmTvm {
    #[wasm_bindgen(constructor)]
    pub fn new(memory_size: usize) -> Result<WasmTvm, JsError> {
        let tvm = Tvm::new(memory_size).map_err(|e| JsError::new(&format!("{e}")))?;
        Ok(Self {
            tvm,
            program: Vec::new(),
        })
    }

    /// Assemble and load a program from T3 assembly source.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let program = assemble(source).map_err(|e| JsError::new(&format!("{e}")))?;
        self.tvm
            .load_program(&program)
            .map_err(|e| JsError::new(&format!("{e}")))?;
        self.program = program;
        Ok(self.program.len())
    }

    /// Execute one instruction, returning its disassembly.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        let instr = self.tvm.step().map_err(|e| JsError::new(&format!("{e}")))?;
        Ok(disassemble_one(&instr))
    }

    /// Run until halted, errored, or `max_steps` instructions.
    #[wasm_bindgen]
    pub fn run(&mut self, max_steps: u32) -> Result<u64, JsError> {
        self.tvm
            .run(max_steps as u64)
            .map_err(|e| JsError::new(&format!("{e}")))
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.tvm.reset();
        if !self.program.is_empty() {
            let _ = self.tvm.load_program(&self.program);
        }
    }

    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.tvm.state == crate::tvm::TvmState::Running
    }

    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.tvm.state)
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> i32 {
        self.tvm.registers.pc()
    }

    #[wasm_bindgen]
    pub fn instructions_executed(&self) -> u64 {
        self.tvm.counters.instructions_executed
    }

    #[wasm_bindgen]
    pub fn register(&self, index: u8) -> Result<i32, JsError> {
        self.tvm.registers.get(index).map_err(|e| JsError::new(&format!("{e}")))
    }

    #[wasm_bindgen]
    pub fn memory_at(&self, address: i32) -> Result<i8, JsError> {
        self.tvm
            .memory
            .read(address)
            .map(|t| t.to_i8())
            .map_err(|e| JsError::new(&format!("{e}")))
    }

    /// A full memory snapshot as a typed array, one byte per trit, for
    /// callers that want to render the whole memory view in one hop
    /// instead of one `memory_at` call per cell.
    #[wasm_bindgen]
    pub fn memory_snapshot(&self) -> js_sys::Int8Array {
        let bytes: Vec<i8> = self.tvm.memory.cells().iter().map(|t| t.to_i8()).collect();
        let array = js_sys::Int8Array::new_with_length(bytes.len() as u32);
        for (i, &b) in bytes.iter().enumerate() {
            array.set_index(i as u32, b);
        }
        array
    }

    #[wasm_bindgen]
    pub fn registers_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.tvm.registers).map_err(|e| JsError::new(&format!("{e}")))
    }
}

/// Assemble source and return the instruction count, without loading it.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<usize, JsError> {
    assemble(source)
        .map(|program| program.len())
        .map_err(|e| JsError::new(&format!("{e}")))
}

/// Disassemble a single 6-byte instruction word.
#[wasm_bindgen]
pub fn wasm_disassemble(bytes: &[u8]) -> Result<String, JsError> {
    let word: [u8; 6] = bytes
        .try_into()
        .map_err(|_| JsError::new("expected exactly 6 bytes"))?;
    crate::tvm::decode(&word)
        .map(|instr| disassemble_one(&instr))
        .map_err(|e| JsError::new(&format!("{e}")))
}
