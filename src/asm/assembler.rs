//! Two-pass assembler for T3 assembly text.
//!
//! Syntax: one instruction per line; opcode mnemonics uppercase; operands
//! `R<n>` for registers, `#<dec>` for an immediate, `@<label>` for a
//! label reference (resolved to the label's instruction address). A
//! label definition is an identifier followed by `:` at the start of a
//! line. A line whose first non-whitespace character is `;` or `#` is a
//! full-line comment; `;` also starts a trailing inline comment. (`#` is
//! not treated as an inline comment marker since it also prefixes
//! immediates — only a line led by `#` is a comment.)

use std::collections::HashMap;

use thiserror::Error;

use crate::tvm::instruction::{Instruction, Opcode};
use crate::tvm::registers::REG_ZERO;

#[derive(Debug, Clone, Error)]
pub enum AssemblerError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("line {line}: unknown mnemonic '{mnemonic}'")]
    UnknownMnemonic { line: usize, mnemonic: String },
    #[error("line {line}: undefined label '{label}'")]
    UndefinedLabel { line: usize, label: String },
    #[error("line {line}: operand '{operand}' is not a valid register/immediate/label")]
    BadOperand { line: usize, operand: String },
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Reg(u8),
    Imm(i32),
}

struct PendingLabel {
    instruction_index: usize,
    label: String,
    line: usize,
}

/// Assemble T3 source text into a sequence of instructions, in program
/// (instruction-index) order — the same addressing space `Tvm`'s code
/// store and `PC` use.
pub fn assemble(source: &str) -> Result<Vec<Instruction>, AssemblerError> {
    let mut symbols: HashMap<String, i32> = HashMap::new();
    let mut pending: Vec<PendingLabel> = Vec::new();
    let mut output: Vec<Instruction> = Vec::new();

    for (line_no, raw_line) in source.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = raw_line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
            continue;
        }
        let line = match trimmed.find(';') {
            Some(idx) => trimmed[..idx].trim(),
            None => trimmed.trim_end(),
        };
        if line.is_empty() {
            continue;
        }

        let (label, rest) = split_label(line);
        if let Some(label) = label {
            symbols.insert(label, output.len() as i32);
        }
        let rest = rest.trim();
        if rest.is_empty() {
            continue;
        }

        let instr = parse_instruction(rest, line_no, output.len(), &mut pending)?;
        output.push(instr);
    }

    for p in &pending {
        let address = symbols
            .get(&p.label)
            .copied()
            .ok_or_else(|| AssemblerError::UndefinedLabel {
                line: p.line,
                label: p.label.clone(),
            })?;
        output[p.instruction_index].immediate = address as i16;
    }

    Ok(output)
}

/// Split `LABEL: rest` into `(Some("LABEL"), "rest")`, or `(None, line)`
/// if there's no label. A colon inside an operand (there are none in
/// this syntax) would be ambiguous, but labels only ever appear at the
/// very start of a line.
fn split_label(line: &str) -> (Option<String>, &str) {
    if let Some(colon_idx) = line.find(':') {
        let candidate = line[..colon_idx].trim();
        if !candidate.is_empty() && candidate.chars().all(is_ident_char) {
            return (Some(candidate.to_uppercase()), &line[colon_idx + 1..]);
        }
    }
    (None, line)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse_instruction(
    line: &str,
    line_no: usize,
    instruction_index: usize,
    pending: &mut Vec<PendingLabel>,
) -> Result<Instruction, AssemblerError> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let mnemonic = parts.next().unwrap_or("").to_uppercase();
    let operand_str = parts.next().unwrap_or("").trim();
    let operands = split_operands(operand_str);

    let mut tokens = Vec::with_capacity(operands.len());
    for operand in &operands {
        tokens.push(parse_operand(
            operand,
            line_no,
            instruction_index,
            pending,
        )?);
    }

    build_instruction(&mnemonic, &tokens, line_no)
}

fn split_operands(s: &str) -> Vec<&str> {
    if s.is_empty() {
        Vec::new()
    } else {
        s.split(',').map(str::trim).filter(|o| !o.is_empty()).collect()
    }
}

fn parse_operand(
    operand: &str,
    line_no: usize,
    instruction_index: usize,
    pending: &mut Vec<PendingLabel>,
) -> Result<Token, AssemblerError> {
    if let Some(rest) = operand.strip_prefix(['R', 'r']) {
        let n: u8 = rest.parse().map_err(|_| AssemblerError::BadOperand {
            line: line_no,
            operand: operand.to_string(),
        })?;
        if n >= 16 {
            return Err(AssemblerError::BadOperand {
                line: line_no,
                operand: operand.to_string(),
            });
        }
        return Ok(Token::Reg(n));
    }
    if let Some(rest) = operand.strip_prefix('#') {
        let v: i32 = rest.parse().map_err(|_| AssemblerError::BadOperand {
            line: line_no,
            operand: operand.to_string(),
        })?;
        return Ok(Token::Imm(v));
    }
    if let Some(label) = operand.strip_prefix('@') {
        pending.push(PendingLabel {
            instruction_index,
            label: label.to_uppercase(),
            line: line_no,
        });
        return Ok(Token::Imm(0)); // patched once labels are resolved
    }
    Err(AssemblerError::BadOperand {
        line: line_no,
        operand: operand.to_string(),
    })
}

/// Map a mnemonic and its parsed operand tokens onto an `Instruction`,
/// mirroring exactly how `Tvm::execute` reads each opcode's fields.
fn build_instruction(mnemonic: &str, tokens: &[Token], line_no: usize) -> Result<Instruction, AssemblerError> {
    let reg = |i: usize| -> Result<u8, AssemblerError> {
        match tokens.get(i) {
            Some(Token::Reg(n)) => Ok(*n),
            _ => Err(AssemblerError::Syntax {
                line: line_no,
                message: format!("{mnemonic} expects a register operand at position {i}"),
            }),
        }
    };
    let imm = |i: usize| -> Result<i16, AssemblerError> {
        match tokens.get(i) {
            Some(Token::Imm(v)) => Ok(*v as i16),
            _ => Err(AssemblerError::Syntax {
                line: line_no,
                message: format!("{mnemonic} expects an immediate/label operand at position {i}"),
            }),
        }
    };

    Ok(match mnemonic {
        "LOAD" => Instruction::new(Opcode::Load, reg(0)?, 0, 0, imm(1)?),
        "STORE" => Instruction::new(Opcode::Store, reg(0)?, 0, 0, imm(1)?),
        "MOV" => match tokens.get(1) {
            Some(Token::Reg(rs)) => Instruction::new(Opcode::Mov, reg(0)?, *rs, 0, 0),
            Some(Token::Imm(v)) => Instruction::new(Opcode::Mov, reg(0)?, REG_ZERO, 0, *v as i16),
            None => {
                return Err(AssemblerError::Syntax {
                    line: line_no,
                    message: "MOV expects a source register or immediate".into(),
                })
            }
        },
        "ADD" => Instruction::new(Opcode::Add, reg(0)?, reg(1)?, reg(2)?, 0),
        "SUB" => Instruction::new(Opcode::Sub, reg(0)?, reg(1)?, reg(2)?, 0),
        "MUL" => Instruction::new(Opcode::Mul, reg(0)?, reg(1)?, reg(2)?, 0),
        "DIV" => Instruction::new(Opcode::Div, reg(0)?, reg(1)?, reg(2)?, 0),
        "AND" => Instruction::new(Opcode::And, reg(0)?, reg(1)?, reg(2)?, 0),
        "OR" => Instruction::new(Opcode::Or, reg(0)?, reg(1)?, reg(2)?, 0),
        "XOR" => Instruction::new(Opcode::Xor, reg(0)?, reg(1)?, reg(2)?, 0),
        "NOT" => Instruction::new(Opcode::Not, reg(0)?, reg(1)?, 0, 0),
        "CMP" => Instruction::new(Opcode::Cmp, reg(0)?, reg(1)?, reg(2)?, 0),
        "JMP" => Instruction::new(Opcode::Jmp, 0, 0, 0, imm(0)?),
        "JZ" => Instruction::new(Opcode::Jz, reg(0)?, 0, 0, imm(1)?),
        "JNZ" => Instruction::new(Opcode::Jnz, reg(0)?, 0, 0, imm(1)?),
        "CALL" => Instruction::new(Opcode::Call, 0, 0, 0, imm(0)?),
        "RET" => Instruction::new(Opcode::Ret, 0, 0, 0, 0),
        "PUSH" => Instruction::new(Opcode::Push, reg(0)?, 0, 0, 0),
        "POP" => Instruction::new(Opcode::Pop, reg(0)?, 0, 0, 0),
        "HALT" => Instruction::new(Opcode::Halt, 0, 0, 0, 0),
        "NOP" => Instruction::new(Opcode::Nop, 0, 0, 0, 0),
        "SYSCALL" => Instruction::new(Opcode::Syscall, 0, 0, 0, 0),
        "IRET" => Instruction::new(Opcode::Iret, 0, 0, 0, 0),
        "CLI" => Instruction::new(Opcode::Cli, 0, 0, 0, 0),
        "STI" => Instruction::new(Opcode::Sti, 0, 0, 0, 0),
        "INT" => Instruction::new(Opcode::Int, 0, 0, 0, 0),
        "CPUID" => Instruction::new(Opcode::Cpuid, reg(0)?, 0, 0, 0),
        "RDTSC" => Instruction::new(Opcode::Rdtsc, 0, 0, 0, 0),
        "LEA" => Instruction::new(Opcode::Lea, reg(0)?, 0, 0, imm(1)?),
        "TST" => Instruction::new(Opcode::Tst, 0, reg(0)?, 0, 0),
        "TGATE" => Instruction::new(Opcode::Tgate, reg(0)?, reg(1)?, reg(2)?, imm(3)?),
        _ => {
            return Err(AssemblerError::UnknownMnemonic {
                line: line_no,
                mnemonic: mnemonic.to_string(),
            })
        }
    })
}
