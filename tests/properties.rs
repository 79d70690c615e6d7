//! Property-based tests for the quantified invariants and round-trip laws.

use proptest::prelude::*;

use ternary_substrate::asm::{read_bytecode, write_bytecode};
use ternary_substrate::gate::{analysis, GateTable, DYADIC_GATE_COUNT};
use ternary_substrate::lambda::reduce::{to_normal_form, ReductionContext};
use ternary_substrate::lambda::subst::substitute;
use ternary_substrate::lambda::{is_alpha_equivalent, Pool, Term};
use ternary_substrate::trit::arith;
use ternary_substrate::trit::{Trit, TritArray};
use ternary_substrate::tvm::{Instruction, Opcode, Tvm, REG_R0, REG_R1};

fn any_trit() -> impl Strategy<Value = Trit> {
    prop_oneof![Just(Trit::Negative), Just(Trit::Zero), Just(Trit::Positive)]
}

proptest! {
    /// ∀ n ∈ [-10_000, 10_000]: to_int(int_to_ternary(n)) = n.
    #[test]
    fn int_round_trips_through_ternary(n in -10_000i32..=10_000) {
        prop_assert_eq!(TritArray::from_int(n).to_int().unwrap(), n);
    }

    /// ∀ a,b,c in Trit: add_with_carry(a,b,c) = add_with_carry(b,a,c).
    #[test]
    fn add_with_carry_is_commutative(a in any_trit(), b in any_trit(), c in any_trit()) {
        prop_assert_eq!(a.add_with_carry(b, c), b.add_with_carry(a, c));
    }

    /// ∀ a,b,c: add(a, add(b,c)) and add(add(a,b), c) represent the same integer.
    #[test]
    fn array_addition_is_associative(x in -5_000i32..=5_000, y in -5_000i32..=5_000, z in -5_000i32..=5_000) {
        let (a, b, c) = (TritArray::from_int(x), TritArray::from_int(y), TritArray::from_int(z));
        let left = arith::add(&a, &arith::add(&b, &c));
        let right = arith::add(&arith::add(&a, &b), &c);
        prop_assert_eq!(left.to_i64(), right.to_i64());
        prop_assert_eq!(left.to_i64(), (x as i64) + (y as i64) + (z as i64));
    }

    /// ∀ strings over {'-','0','+'}: string_to_ternary(ternary_to_string(s)) = s.
    #[test]
    fn string_alphabet_round_trips(digits in prop::collection::vec(prop_oneof![Just('-'), Just('0'), Just('+')], 0..32)) {
        let s: String = digits.into_iter().collect();
        let parsed = TritArray::from_str_alphabet(&s).unwrap();
        let rendered = parsed.to_string_alphabet();
        let reparsed = TritArray::from_str_alphabet(&rendered).unwrap();
        prop_assert_eq!(reparsed.to_i64(), parsed.to_i64());
    }

    /// ∀ gate id with derived is_commutative=true: eval(id,a,b)=eval(id,b,a).
    #[test]
    fn commutative_gates_really_are(id in 0u32..DYADIC_GATE_COUNT as u32) {
        let table = GateTable::standard();
        if let Some(properties) = analysis::derive(table, id) {
            if properties.commutative {
                for a in Trit::ALL {
                    for b in Trit::ALL {
                        let ab = ternary_substrate::gate::eval_dyadic(table, id, a, b).unwrap();
                        let ba = ternary_substrate::gate::eval_dyadic(table, id, b, a).unwrap();
                        prop_assert_eq!(ab, ba);
                    }
                }
            }
        }
    }

    /// One beta-step of (\x.M) N is alpha-equivalent to M[x:=N], for disjoint binders.
    #[test]
    fn one_step_matches_substitution(free_var in 1_000i32..2_000, replacement_var in 2_000i32..3_000) {
        let mut pool = Pool::new(64);
        let body = pool.alloc(Term::Variable(free_var));
        let abs = pool.alloc(Term::abstraction(free_var, body));
        let replacement = pool.alloc(Term::Variable(replacement_var));
        let replacement_for_subst = pool.retain(replacement);
        let app = pool.alloc(Term::application(abs, replacement));

        let stepped = ternary_substrate::lambda::reduce::step(&mut pool, app).expect("redex available");
        let substituted = substitute(&mut pool, body, free_var, replacement_for_subst);

        prop_assert!(is_alpha_equivalent(&pool, stepped, substituted));
    }

    /// After retain then release, reference counts return to their starting value.
    #[test]
    fn retain_release_balances_ref_counts(extra_retains in 1usize..8) {
        let mut pool = Pool::new(32);
        let id = pool.alloc(Term::Variable(0));
        let starting = pool.ref_count(id);

        for _ in 0..extra_retains {
            pool.retain(id);
        }
        for _ in 0..extra_retains {
            pool.release(id);
        }

        prop_assert_eq!(pool.ref_count(id), starting);
        prop_assert_eq!(pool.live_count(), 1);
    }

    /// Compile-then-execute: (\x.x) applied to a variable leaves R0 holding
    /// the sign of that variable's id (this compiler's integer encoding,
    /// since a register holds exactly one trit).
    #[test]
    fn compile_then_execute_identity_application(var_id in (-2_000i32..2_000).prop_filter("nonzero", |v| *v != 0)) {
        let mut pool = Pool::new(16);
        let x = pool.alloc(Term::Variable(0));
        let identity = pool.alloc(Term::abstraction(0, x));
        let argument = pool.alloc(Term::Variable(var_id));
        let app = pool.alloc(Term::application(identity, argument));

        let bytecode = ternary_substrate::lambda::compile(&pool, app, 4096).unwrap();
        let mut tvm = Tvm::new(64).unwrap();
        tvm.load_program_bytes(&bytecode).unwrap();
        tvm.run(1_000).unwrap();

        prop_assert_eq!(tvm.registers.get(REG_R0).unwrap(), var_id.signum());
    }

    /// Bytecode serialize -> deserialize -> serialize is byte-identical.
    #[test]
    fn bytecode_round_trip_is_byte_identical(
        opcodes in prop::collection::vec(
            prop_oneof![
                Just(Opcode::Mov), Just(Opcode::Add), Just(Opcode::Jmp),
                Just(Opcode::Push), Just(Opcode::Pop), Just(Opcode::Nop),
            ],
            1..16,
        ),
    ) {
        let program: Vec<Instruction> = opcodes
            .into_iter()
            .map(|op| Instruction::new(op, REG_R0, REG_R1, 0, 5))
            .collect();

        let bytes = write_bytecode(&program);
        let decoded = read_bytecode(&bytes).unwrap();
        let bytes_again = write_bytecode(&decoded);

        prop_assert_eq!(bytes, bytes_again);
    }
}

/// ∀ n, 5 timed-out steps still return an alpha-equivalent clone of the input.
#[test]
fn max_steps_zero_returns_input_clone() {
    let mut pool = Pool::new(16);
    let x = pool.alloc(Term::Variable(0));
    let identity = pool.alloc(Term::abstraction(0, x));
    let arg = pool.alloc(Term::Variable(1));
    let app = pool.alloc(Term::application(identity, arg));

    let mut ctx = ReductionContext::new(0, 64);
    let result = to_normal_form(&mut pool, app, &mut ctx);

    assert!(ctx.timeout);
    assert!(is_alpha_equivalent(&pool, result, app));
}

/// i-cache warm vs cold execution produces identical final register/memory
/// state; only counters differ.
#[test]
fn icache_warm_and_cold_agree_on_final_state() {
    let program = [
        Instruction::new(Opcode::Load, REG_R0, 0, 0, 1),
        Instruction::new(Opcode::Add, REG_R1, REG_R0, REG_R0, 0),
        Instruction::new(Opcode::Jmp, 0, 0, 0, 4),
        Instruction::new(Opcode::Nop, 0, 0, 0, 0),
        Instruction::new(Opcode::Halt, 0, 0, 0, 0),
    ];

    let mut cold = Tvm::with_capacities(32, 1, 1).unwrap();
    cold.memory.write(1, Trit::Positive).unwrap();
    cold.load_program(&program).unwrap();
    cold.run(0).unwrap();

    let mut warm = Tvm::with_capacities(32, 64, 64).unwrap();
    warm.memory.write(1, Trit::Positive).unwrap();
    warm.load_program(&program).unwrap();
    warm.run(0).unwrap();
    // Run it again so the i-cache is actually warm on a second execution.
    warm.reset();
    warm.memory.write(1, Trit::Positive).unwrap();
    warm.run(0).unwrap();

    assert_eq!(cold.registers.get(REG_R0).unwrap(), warm.registers.get(REG_R0).unwrap());
    assert_eq!(cold.registers.get(REG_R1).unwrap(), warm.registers.get(REG_R1).unwrap());
    assert_eq!(cold.state, warm.state);
}
