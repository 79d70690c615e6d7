//! Lowering lambda terms to T3 bytecode.
//!
//! The T3-ISA has no indirect call (`CALL` takes an immediate target, not
//! a register), so only *direct* redexes — an `Application` whose function
//! position is syntactically an `Abstraction` — lower to real control
//! flow. Every compiled subterm leaves its value in `R0`; a bound
//! variable's value lives in whatever register its binder was popped
//! into, tracked through `scope` while compiling the binder's body.

use thiserror::Error;

use crate::tvm::instruction::{encode, Instruction, Opcode, INSTRUCTION_BYTES};
use crate::tvm::registers::{REG_R0, REG_R1, REG_ZERO};

use super::pool::{Pool, TermId};
use super::term::Term;

#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("application target is not syntactically an abstraction; indirect/higher-order calls cannot be lowered to this ISA")]
    IndirectCall,
    #[error("compiled program needs {needed} bytes but the buffer capacity is {capacity}")]
    Overflow { needed: usize, capacity: usize },
}

/// Compile `term` to a T3 bytecode buffer of at most `capacity` bytes.
/// The compiled program leaves its result in `R0` and ends with `HALT`.
pub fn compile(pool: &Pool, term: TermId, capacity: usize) -> Result<Vec<u8>, CompileError> {
    let mut out = Vec::new();
    compile_term(pool, term, REG_R0, &[], &mut out)?;
    out.push(Instruction::new(Opcode::Halt, 0, 0, 0, 0));

    let needed = out.len() * INSTRUCTION_BYTES;
    if needed > capacity {
        return Err(CompileError::Overflow { needed, capacity });
    }
    Ok(out.iter().flat_map(encode).collect())
}

/// `scope` maps a binder's variable id to the register its argument was
/// popped into, innermost binder last.
fn compile_term(
    pool: &Pool,
    id: TermId,
    target: u8,
    scope: &[(i32, u8)],
    out: &mut Vec<Instruction>,
) -> Result<(), CompileError> {
    match pool.get(id) {
        Term::Variable(var_id) => {
            if let Some(&(_, reg)) = scope.iter().rev().find(|(bound, _)| bound == var_id) {
                if reg != target {
                    out.push(Instruction::new(Opcode::Mov, target, reg, 0, 0));
                }
            } else {
                // Free variable: materialize the sign of its id, since a
                // register holds exactly one trit.
                out.push(Instruction::new(
                    Opcode::Mov,
                    target,
                    REG_ZERO,
                    0,
                    var_id.signum() as i16,
                ));
            }
            Ok(())
        }
        Term::Abstraction { var_id, body } => {
            // A bare function value with no application site: call it
            // with a dummy zero argument so the program still leaves a
            // concrete result in `target`.
            let label = compile_closed_function(pool, *var_id, *body, scope, out)?;
            emit_call(target, REG_ZERO, label, out);
            Ok(())
        }
        Term::Application { function, argument } => {
            if let Term::Abstraction { var_id, body } = pool.get(*function) {
                let label = compile_closed_function(pool, *var_id, *body, scope, out)?;
                compile_term(pool, *argument, REG_R1, scope, out)?;
                emit_call(target, REG_R1, label, out);
                Ok(())
            } else {
                Err(CompileError::IndirectCall)
            }
        }
    }
}

/// Emit `PUSH arg_reg; CALL label`, then copy the callee's `R0` result
/// into `target` if it isn't already there.
fn emit_call(target: u8, arg_reg: u8, label: i32, out: &mut Vec<Instruction>) {
    out.push(Instruction::new(Opcode::Push, arg_reg, 0, 0, 0));
    out.push(Instruction::new(Opcode::Call, 0, 0, 0, label as i16));
    if target != REG_R0 {
        out.push(Instruction::new(Opcode::Mov, target, REG_R0, 0, 0));
    }
}

/// Emit a callable function body (`POP` the argument, compute into `R0`,
/// `RET`), preceded by a `JMP` that skips over it in the fall-through
/// control flow, and return its entry address.
fn compile_closed_function(
    pool: &Pool,
    var_id: i32,
    body: TermId,
    outer_scope: &[(i32, u8)],
    out: &mut Vec<Instruction>,
) -> Result<i32, CompileError> {
    let jmp_index = out.len();
    out.push(Instruction::new(Opcode::Jmp, 0, 0, 0, 0)); // patched below

    let label = out.len() as i32;
    out.push(Instruction::new(Opcode::Pop, REG_R0, 0, 0, 0));

    let mut inner_scope = outer_scope.to_vec();
    inner_scope.push((var_id, REG_R0));
    compile_term(pool, body, REG_R0, &inner_scope, out)?;
    out.push(Instruction::new(Opcode::Ret, 0, 0, 0, 0));

    let after = out.len() as i32;
    out[jmp_index] = Instruction::new(Opcode::Jmp, 0, 0, 0, after as i16);
    Ok(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvm::{Tvm, REG_R0};

    #[test]
    fn compiling_a_free_variable_loads_its_sign() {
        let mut pool = Pool::new(8);
        let v = pool.alloc(Term::Variable(-5));
        let bytes = compile(&pool, v, 4096).unwrap();

        let mut tvm = Tvm::new(256).unwrap();
        tvm.load_program_bytes(&bytes).unwrap();
        tvm.run(32).unwrap();
        assert_eq!(tvm.registers.get(REG_R0).unwrap(), -1);
    }

    #[test]
    fn compiling_an_identity_application_returns_the_argument() {
        // (lambda x. x) y, y free with a positive id -> R0 holds +1
        let mut pool = Pool::new(8);
        let x_ref = pool.alloc(Term::Variable(0));
        let identity = pool.alloc(Term::abstraction(0, x_ref));
        let y = pool.alloc(Term::Variable(3));
        let app = pool.alloc(Term::application(identity, y));

        let bytes = compile(&pool, app, 4096).unwrap();
        let mut tvm = Tvm::new(256).unwrap();
        tvm.load_program_bytes(&bytes).unwrap();
        tvm.run(64).unwrap();
        assert_eq!(tvm.registers.get(REG_R0).unwrap(), 1);
    }

    #[test]
    fn indirect_application_is_rejected() {
        // x y, with x a free variable used as the function position
        let mut pool = Pool::new(8);
        let x = pool.alloc(Term::Variable(0));
        let y = pool.alloc(Term::Variable(1));
        let app = pool.alloc(Term::application(x, y));

        assert!(matches!(
            compile(&pool, app, 4096),
            Err(CompileError::IndirectCall)
        ));
    }

    #[test]
    fn overflow_is_reported_when_the_buffer_is_too_small() {
        let mut pool = Pool::new(8);
        let v = pool.alloc(Term::Variable(1));
        assert!(matches!(
            compile(&pool, v, 0),
            Err(CompileError::Overflow { .. })
        ));
    }
}
