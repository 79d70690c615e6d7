//! Ternary Substrate - CLI Entry Point
//!
//! Commands:
//! - `ternary-substrate run <program>` - assemble/load and run a T3 program
//! - `ternary-substrate asm <source>` - assemble T3 source to bytecode
//! - `ternary-substrate disasm <bytecode>` - disassemble a bytecode file
//! - `ternary-substrate debug <program>` - interactive TUI debugger
//! - `ternary-substrate gate <id>` - print a gate's truth table and properties
//! - `ternary-substrate gate-dump <path>` / `gate-load <path>` - persist/verify the full gate tables
//! - `ternary-substrate reduce <term>` - beta-reduce a lambda term, optionally run it

mod lambda_syntax;

use clap::{Parser, Subcommand};

use ternary_substrate::{assemble, disassemble};
use ternary_substrate::asm::{disassemble_one, read_bytecode, write_bytecode};
use ternary_substrate::gate::io::{read_table, write_table};
use ternary_substrate::gate::tables::{DYADIC_GATE_COUNT, MONADIC_GATE_COUNT};
use ternary_substrate::gate::{analysis, well_known, GateTable};
use ternary_substrate::lambda::{compile, reduce, Pool};
use ternary_substrate::tvm::Tvm;

#[derive(Parser)]
#[command(name = "ternary-substrate")]
#[command(version)]
#[command(about = "A balanced-ternary execution substrate: gates, a register VM, and a lambda compiler")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to a `.asm` or bytecode file
        program: String,
        /// Maximum number of instructions to execute
        #[arg(short, long, default_value = "100000")]
        max_steps: u64,
        /// Print each instruction as it executes
        #[arg(short, long)]
        trace: bool,
        /// Print the final register/counter state as JSON instead of text
        #[arg(short, long)]
        json: bool,
    },
    /// Interactive TUI debugger
    #[cfg(feature = "tui")]
    Debug {
        /// Path to a `.asm` or bytecode file
        program: String,
    },
    /// Assemble T3 source to bytecode
    Asm {
        /// Path to the source file
        source: String,
        /// Output bytecode file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble a bytecode file to readable text
    Disasm {
        /// Path to the bytecode file
        bytecode: String,
    },
    /// Print a dyadic gate's truth table and derived algebraic properties
    Gate {
        /// Gate id in [0, 19683), or a well-known name (AND, OR, XOR, PLUS,
        /// TIMES, CONSENSUS, MINORITY)
        id: String,
    },
    /// Write the full dyadic/monadic gate tables to a binary file
    GateDump {
        /// Output file path
        path: String,
    },
    /// Read and verify a gate table file written by `gate-dump`
    GateLoad {
        /// Path to a file written by `gate-dump`
        path: String,
    },
    /// Beta-reduce a lambda term to normal form
    Reduce {
        /// Term in the surface syntax: `\x.x`, application by juxtaposition
        term: String,
        /// Maximum reduction steps before giving up
        #[arg(short, long, default_value = "10000")]
        max_steps: u64,
        /// Maximum term depth before giving up
        #[arg(short = 'd', long, default_value = "1024")]
        max_depth: u32,
        /// Compile the normal form to T3 bytecode and run it
        #[arg(short, long)]
        run: bool,
    },
}

fn main() {
    #[cfg(feature = "observability")]
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run { program, max_steps, trace, json }) => run_program(&program, max_steps, trace, json),
        #[cfg(feature = "tui")]
        Some(Commands::Debug { program }) => debug_program(&program),
        Some(Commands::Asm { source, output }) => assemble_file(&source, output),
        Some(Commands::Disasm { bytecode }) => disassemble_file(&bytecode),
        Some(Commands::Gate { id }) => print_gate(&id),
        Some(Commands::GateDump { path }) => dump_gate_table(&path),
        Some(Commands::GateLoad { path }) => load_gate_table(&path),
        Some(Commands::Reduce { term, max_steps, max_depth, run }) => {
            reduce_term(&term, max_steps, max_depth, run)
        }
        None => {
            println!("ternary-substrate: balanced-ternary gates, VM, and lambda compiler");
            println!("Use --help for available commands");
            Ok(())
        }
    };

    if let Err(message) = result {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

fn load_instructions(path: &str) -> Result<Vec<ternary_substrate::Instruction>, String> {
    if path.ends_with(".asm") {
        let source = std::fs::read_to_string(path).map_err(|e| format!("reading {path}: {e}"))?;
        assemble(&source).map_err(|e| format!("assembling {path}: {e}"))
    } else {
        let bytes = std::fs::read(path).map_err(|e| format!("reading {path}: {e}"))?;
        read_bytecode(&bytes).map_err(|e| format!("decoding {path}: {e}"))
    }
}

#[derive(serde::Serialize)]
struct RunReport<'a> {
    instructions_loaded: usize,
    executed: u64,
    state: &'a ternary_substrate::TvmState,
    registers: &'a ternary_substrate::tvm::Registers,
    counters: &'a ternary_substrate::tvm::Counters,
    reached_max_steps: bool,
}

fn run_program(path: &str, max_steps: u64, trace: bool, json: bool) -> Result<(), String> {
    let program = load_instructions(path)?;
    let mut tvm = Tvm::default();
    tvm.load_program(&program).map_err(|e| format!("loading program: {e}"))?;

    if !json {
        println!("loaded {} instructions from {path}", program.len());
    }

    let mut executed = 0u64;
    while tvm.state == ternary_substrate::TvmState::Running && executed < max_steps {
        let pc = tvm.registers.pc();
        match tvm.step() {
            Ok(instr) => {
                if trace {
                    println!("{pc:04}: {}", disassemble_one(&instr));
                }
                executed += 1;
            }
            Err(e) => return Err(format!("at pc={pc}: {e}")),
        }
    }

    let reached_max_steps = executed >= max_steps && tvm.state == ternary_substrate::TvmState::Running;

    if json {
        let report = RunReport {
            instructions_loaded: program.len(),
            executed,
            state: &tvm.state,
            registers: &tvm.registers,
            counters: &tvm.counters,
            reached_max_steps,
        };
        println!("{}", serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?);
        return Ok(());
    }

    println!();
    println!("state: {:?}", tvm.state);
    println!("instructions executed: {executed}");
    println!(
        "i-cache hits/misses: {}/{}",
        tvm.counters.cache_hits, tvm.counters.cache_misses
    );
    println!(
        "branch predictions/mispredictions: {}/{}",
        tvm.counters.branch_predictions, tvm.counters.branch_mispredictions
    );

    if reached_max_steps {
        println!("reached max-steps limit ({max_steps}); use --max-steps to raise it");
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn debug_program(path: &str) -> Result<(), String> {
    let program = load_instructions(path)?;
    let mut tvm = Tvm::default();
    tvm.load_program(&program).map_err(|e| format!("loading program: {e}"))?;
    ternary_substrate::run_debugger(tvm, program).map_err(|e| format!("debugger: {e}"))
}

fn assemble_file(source_path: &str, output: Option<String>) -> Result<(), String> {
    let out_path = output.unwrap_or_else(|| {
        if source_path.ends_with(".asm") {
            source_path.replace(".asm", ".t3b")
        } else {
            format!("{source_path}.t3b")
        }
    });

    let source = std::fs::read_to_string(source_path).map_err(|e| format!("reading {source_path}: {e}"))?;
    let program = assemble(&source).map_err(|e| format!("assembly error: {e}"))?;
    println!("assembled {} instructions", program.len());

    let bytes = write_bytecode(&program);
    std::fs::write(&out_path, &bytes).map_err(|e| format!("writing {out_path}: {e}"))?;
    println!("wrote {out_path} ({} bytes)", bytes.len());
    Ok(())
}

fn disassemble_file(path: &str) -> Result<(), String> {
    let bytes = std::fs::read(path).map_err(|e| format!("reading {path}: {e}"))?;
    let program = read_bytecode(&bytes).map_err(|e| format!("decoding {path}: {e}"))?;
    println!("{}", disassemble(&program));
    Ok(())
}

fn print_gate(id_str: &str) -> Result<(), String> {
    let id = match id_str.to_ascii_uppercase().as_str() {
        "AND" => well_known::KLEENE_AND,
        "OR" => well_known::KLEENE_OR,
        "XOR" => well_known::XOR,
        "PLUS" => well_known::PLUS,
        "TIMES" => well_known::TIMES,
        "CONSENSUS" => well_known::CONSENSUS,
        "MINORITY" => well_known::MINORITY,
        other => other.parse::<u32>().map_err(|_| format!("unrecognized gate id or name: {other}"))?,
    };

    let table = GateTable::standard();
    let truth_table = analysis::truth_table(table, id).ok_or_else(|| format!("gate id {id} out of range"))?;
    let properties = analysis::derive(table, id).expect("truth_table succeeded above");

    println!("gate {id}");
    println!("{truth_table}");
    println!("commutative: {}", properties.commutative);
    println!("associative: {}", properties.associative);
    println!("identity: {:?}", properties.identity);
    Ok(())
}

fn dump_gate_table(path: &str) -> Result<(), String> {
    let table = GateTable::standard();
    let dyadic: Vec<[ternary_substrate::Trit; 9]> = (0..DYADIC_GATE_COUNT as u32)
        .map(|id| *table.dyadic_row(id).expect("id in range"))
        .collect();
    let monadic: Vec<[ternary_substrate::Trit; 3]> = (0..MONADIC_GATE_COUNT as u32)
        .map(|id| *table.monadic_row(id).expect("id in range"))
        .collect();

    let mut file = std::fs::File::create(path).map_err(|e| format!("creating {path}: {e}"))?;
    write_table(&mut file, &dyadic, &monadic).map_err(|e| format!("writing {path}: {e}"))?;
    println!("wrote {} dyadic rows, {} monadic rows to {path}", dyadic.len(), monadic.len());
    Ok(())
}

fn load_gate_table(path: &str) -> Result<(), String> {
    let mut file = std::fs::File::open(path).map_err(|e| format!("opening {path}: {e}"))?;
    let (dyadic, monadic) = read_table(&mut file).map_err(|e| format!("reading {path}: {e}"))?;
    println!("read {} dyadic rows, {} monadic rows from {path}", dyadic.len(), monadic.len());
    Ok(())
}

fn reduce_term(source: &str, max_steps: u64, max_depth: u32, run: bool) -> Result<(), String> {
    let mut pool = Pool::new(256);
    let term = lambda_syntax::parse(&mut pool, source).map_err(|e| format!("parse error: {e}"))?;

    let mut ctx = reduce::ReductionContext::new(max_steps, max_depth);
    let normal_form = reduce::to_normal_form(&mut pool, term, &mut ctx);

    println!("{}", lambda_syntax::format(&pool, normal_form));
    println!("steps: {}, depth: {}, timed out: {}", ctx.step_count, ctx.depth, ctx.timeout);

    if run {
        let bytecode = compile(&pool, normal_form, 4096).map_err(|e| format!("compile error: {e}"))?;
        let mut tvm = Tvm::default();
        tvm.load_program_bytes(&bytecode).map_err(|e| format!("loading compiled program: {e}"))?;
        let executed = tvm.run(max_steps).map_err(|e| format!("running compiled program: {e}"))?;
        println!();
        println!("ran {executed} instructions, R0 = {}", tvm.registers.get(0).unwrap_or(0));
    }
    Ok(())
}
