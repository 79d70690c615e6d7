//! Disassembling `Instruction`s back to T3 assembly text.
//!
//! The inverse of [`super::assembler::assemble`]'s operand conventions:
//! each opcode formats exactly the fields `Tvm::execute` reads for it,
//! so `assemble(&disassemble(program)) == program` modulo label names
//! (labels are not reconstructed — jump/call targets print as `@<addr>`
//! numeric labels).

use crate::tvm::instruction::{Instruction, Opcode};
use crate::tvm::registers::REG_ZERO;

/// Render one instruction as a line of T3 assembly (no trailing newline).
pub fn disassemble_one(instr: &Instruction) -> String {
    let r = |n: u8| format!("R{n}");
    match instr.opcode {
        Opcode::Load => format!("LOAD {}, #{}", r(instr.op1), instr.immediate),
        Opcode::Store => format!("STORE {}, #{}", r(instr.op1), instr.immediate),
        Opcode::Mov if instr.op2 == REG_ZERO => {
            format!("MOV {}, #{}", r(instr.op1), instr.immediate)
        }
        Opcode::Mov => format!("MOV {}, {}", r(instr.op1), r(instr.op2)),
        Opcode::Add => format!("ADD {}, {}, {}", r(instr.op1), r(instr.op2), r(instr.op3)),
        Opcode::Sub => format!("SUB {}, {}, {}", r(instr.op1), r(instr.op2), r(instr.op3)),
        Opcode::Mul => format!("MUL {}, {}, {}", r(instr.op1), r(instr.op2), r(instr.op3)),
        Opcode::Div => format!("DIV {}, {}, {}", r(instr.op1), r(instr.op2), r(instr.op3)),
        Opcode::And => format!("AND {}, {}, {}", r(instr.op1), r(instr.op2), r(instr.op3)),
        Opcode::Or => format!("OR {}, {}, {}", r(instr.op1), r(instr.op2), r(instr.op3)),
        Opcode::Xor => format!("XOR {}, {}, {}", r(instr.op1), r(instr.op2), r(instr.op3)),
        Opcode::Not => format!("NOT {}, {}", r(instr.op1), r(instr.op2)),
        Opcode::Cmp => format!("CMP {}, {}, {}", r(instr.op1), r(instr.op2), r(instr.op3)),
        Opcode::Jmp => format!("JMP @{}", instr.immediate),
        Opcode::Jz => format!("JZ {}, @{}", r(instr.op1), instr.immediate),
        Opcode::Jnz => format!("JNZ {}, @{}", r(instr.op1), instr.immediate),
        Opcode::Call => format!("CALL @{}", instr.immediate),
        Opcode::Ret => "RET".to_string(),
        Opcode::Push => format!("PUSH {}", r(instr.op1)),
        Opcode::Pop => format!("POP {}", r(instr.op1)),
        Opcode::Halt => "HALT".to_string(),
        Opcode::Nop => "NOP".to_string(),
        Opcode::Syscall => "SYSCALL".to_string(),
        Opcode::Iret => "IRET".to_string(),
        Opcode::Cli => "CLI".to_string(),
        Opcode::Sti => "STI".to_string(),
        Opcode::Cpuid => format!("CPUID {}", r(instr.op1)),
        Opcode::Rdtsc => "RDTSC".to_string(),
        Opcode::Int => "INT".to_string(),
        Opcode::Lea => format!("LEA {}, #{}", r(instr.op1), instr.immediate),
        Opcode::Tst => format!("TST {}", r(instr.op2)),
        Opcode::Tgate => format!(
            "TGATE {}, {}, {}, #{}",
            r(instr.op1),
            r(instr.op2),
            r(instr.op3),
            instr.immediate
        ),
    }
}

/// Disassemble a whole program, one line per instruction, numbering each
/// with its instruction address (the same address space `PC`, `JMP`, and
/// `CALL` use).
pub fn disassemble(program: &[Instruction]) -> String {
    program
        .iter()
        .enumerate()
        .map(|(addr, instr)| format!("{addr:04}: {}", disassemble_one(instr)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_assembler() {
        use super::super::assembler::assemble;

        let source = "LOAD R0, #1\nMOV R1, #-1\nADD R2, R0, R1\nHALT\n";
        let program = assemble(source).unwrap();
        let text = disassemble(&program);
        let reassembled = assemble(&text.lines().map(|l| l.split_once(": ").unwrap().1).collect::<Vec<_>>().join("\n")).unwrap();
        assert_eq!(program, reassembled);
    }

    #[test]
    fn formats_jump_targets_as_numeric_labels() {
        let instr = Instruction::new(Opcode::Jmp, 0, 0, 0, 7);
        assert_eq!(disassemble_one(&instr), "JMP @7");
    }
}
