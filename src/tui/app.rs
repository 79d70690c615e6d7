//! Debugger application state and logic.

use std::collections::HashSet;

use crate::asm::disassemble_one;
use crate::tvm::{Instruction, Tvm, TvmState};

/// Debugger application state.
pub struct DebuggerApp {
    /// The machine being debugged.
    pub tvm: Tvm,
    /// Original program, kept so `reset` can reload it.
    pub program: Vec<Instruction>,
    /// Breakpoints, by instruction address.
    pub breakpoints: HashSet<i32>,
    /// Is the debugger running continuously (vs. single-stepping)?
    pub running: bool,
    /// Should the main loop exit?
    pub should_quit: bool,
    /// Status line shown under the disassembly view.
    pub status: String,
    /// Memory view scroll offset.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    pub fn new(mut tvm: Tvm, program: Vec<Instruction>) -> Self {
        let _ = tvm.load_program(&program);
        Self {
            tvm,
            program,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            mem_scroll: 0,
        }
    }

    /// Execute exactly one instruction.
    pub fn step(&mut self) {
        if self.tvm.state != TvmState::Running {
            self.status = format!("machine is {:?}", self.tvm.state);
            self.running = false;
            return;
        }
        let pc = self.tvm.registers.pc();
        match self.tvm.step() {
            Ok(instr) => {
                self.status = format!("PC={pc:04}: {}", disassemble_one(&instr));
            }
            Err(e) => {
                self.status = format!("error: {e}");
                self.running = false;
            }
        }
    }

    /// Begin continuous execution (driven by repeated [`Self::tick`] calls
    /// from the event loop).
    pub fn run(&mut self) {
        self.running = true;
        self.status = "running...".into();
    }

    /// One iteration of continuous execution; stops at a breakpoint, halt,
    /// or error.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        if self.tvm.state != TvmState::Running {
            self.running = false;
            self.status = format!(
                "stopped after {} instructions ({:?})",
                self.tvm.counters.instructions_executed, self.tvm.state
            );
            return;
        }
        let pc = self.tvm.registers.pc();
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("breakpoint at PC={pc}");
            return;
        }
        self.step();
    }

    pub fn toggle_breakpoint(&mut self) {
        let pc = self.tvm.registers.pc();
        if self.breakpoints.remove(&pc) {
            self.status = format!("removed breakpoint at PC={pc}");
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("set breakpoint at PC={pc}");
        }
    }

    pub fn reset(&mut self) {
        self.tvm.reset();
        let _ = self.tvm.load_program(&self.program);
        self.running = false;
        self.status = "reset. ready.".into();
    }

    /// Disassembly lines centered on the current `PC`: `(address, text,
    /// is_current)`.
    pub fn disassembly(&self, lines: usize) -> Vec<(i32, String, bool)> {
        let pc = self.tvm.registers.pc();
        let start = (pc - lines as i32 / 2).max(0);
        (0..lines as i32)
            .filter_map(|i| {
                let addr = start + i;
                self.tvm.instruction_at(addr).map(|instr| {
                    (addr, disassemble_one(&instr), addr == pc)
                })
            })
            .collect()
    }
}

/// Run the interactive debugger until the user quits.
pub fn run_debugger(tvm: Tvm, program: Vec<Instruction>) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(tvm, program);

    loop {
        terminal.draw(|frame| super::ui::draw(frame, &app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => {
                            app.mem_scroll = app.mem_scroll.saturating_sub(1);
                        }
                        KeyCode::Down => {
                            let ceiling = app.tvm.memory.len().saturating_sub(1);
                            if app.mem_scroll < ceiling {
                                app.mem_scroll += 1;
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick();
        }
        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
