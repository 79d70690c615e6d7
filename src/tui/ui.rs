//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::tvm::TvmState;
use crate::tvm::registers::{REG_ACC, REG_CR, REG_FP, REG_LR, REG_PC, REG_SP, REG_TMP};

use super::app::DebuggerApp;

pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(frame.area());

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(9),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_disassembly(frame, left[0], app);
    draw_registers(frame, left[1], app);
    draw_status(frame, left[2], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(5),
            Constraint::Length(6),
        ])
        .split(chunks[1]);

    draw_memory(frame, right[0], app);
    draw_counters(frame, right[1], app);
    draw_help(frame, right[2]);
}

fn draw_disassembly(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let lines = app.disassembly((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = lines
        .iter()
        .map(|(addr, text, is_current)| {
            let cursor = if *is_current { "▶" } else { " " };
            let bp = if app.breakpoints.contains(addr) { "●" } else { " " };
            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            ListItem::new(format!("{bp}{cursor} {addr:04}: {text}")).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Disassembly ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(list, area);
}

fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = &app.tvm.registers;
    let r = |n: u8| regs.get(n).unwrap_or(0);

    let general: Vec<Span> = (0..8)
        .map(|n| Span::raw(format!("R{n}={:+} ", r(n))))
        .collect();

    let content = vec![
        Line::from(general),
        Line::from(vec![
            Span::raw(format!("PC={:<5} ", r(REG_PC))),
            Span::raw(format!("SP={:<5} ", r(REG_SP))),
            Span::raw(format!("FP={:<5} ", r(REG_FP))),
            Span::raw(format!("LR={:<5} ", r(REG_LR))),
        ]),
        Line::from(vec![
            Span::raw(format!("CR={:+} ", r(REG_CR))),
            Span::raw(format!("ACC={:+} ", r(REG_ACC))),
            Span::raw(format!("TMP={:+} ", r(REG_TMP))),
        ]),
        Line::from(vec![
            Span::raw("state: "),
            Span::styled(
                format!("{:?}", app.tvm.state),
                match app.tvm.state {
                    TvmState::Running => Style::default().fg(Color::Green),
                    TvmState::Halted => Style::default().fg(Color::Yellow),
                    TvmState::Error => Style::default().fg(Color::Red),
                },
            ),
            Span::raw(format!("   instructions: {}", app.tvm.counters.instructions_executed)),
        ]),
    ];

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );
    frame.render_widget(paragraph, area);
}

fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible = (area.height as usize).saturating_sub(2);
    let start = app.mem_scroll;
    let end = (start + visible).min(app.tvm.memory.len());

    let items: Vec<ListItem> = (start..end)
        .filter_map(|addr| {
            let value = app.tvm.memory.read(addr as i32).ok()?;
            let style = if value.is_zero() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            Some(ListItem::new(format!("{addr:04}: {value}")).style(style))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );
    frame.render_widget(list, area);
}

fn draw_counters(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let c = &app.tvm.counters;
    let content = vec![
        Line::from(format!("i-cache hits/misses: {}/{}", c.cache_hits, c.cache_misses)),
        Line::from(format!(
            "branch predictions/mispredicts: {}/{}",
            c.branch_predictions, c.branch_mispredictions
        )),
    ];
    let paragraph = Paragraph::new(content).block(
        Block::default()
            .title(" Counters ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(paragraph, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default().title(" Status ").borders(Borders::ALL));
    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓: Scroll memory  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default().title(" Help ").borders(Borders::ALL));
    frame.render_widget(help, area);
}
