mod help;
mod reel;
mod state;

use crate::cli::ReelPlan;
use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Terminal,
};
use slot_wheel::engine::ReelSurface;
use slot_wheel::{render_strip, ReelGeometry, WheelEvent};
use state::UiState;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Everything the draw functions read besides `UiState`.
struct Machine {
    geometry: ReelGeometry,
    strip: Vec<String>,
    surfaces: Vec<ReelSurface>,
}

pub async fn run(plan: ReelPlan) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<WheelEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // Wheel tasks animate one clone of each surface, the UI thread reads the other.
    let surfaces: Vec<ReelSurface> = (0..plan.wheels).map(|_| ReelSurface::new()).collect();
    let bank = orchestrator::spawn_bank(&plan, surfaces.clone(), event_tx)?;

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_plan = plan.clone();
    let ui_handle =
        std::thread::spawn(move || run_threaded(ui_plan, surfaces, event_rx, cmd_tx));

    let res = orchestrator::run_controller(&plan, bank, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    plan: ReelPlan,
    surfaces: Vec<ReelSurface>,
    mut event_rx: UnboundedReceiver<WheelEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    let machine = Machine {
        geometry: ReelGeometry::new(plan.items.len(), plan.item_height)?,
        strip: render_strip(&plan.items),
        surfaces,
    };
    let mut state = UiState::new(plan.items.clone(), plan.wheels);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // Reels move every frame, so redraw faster than a dashboard would.
    let tick_rate = Duration::from_millis(33);
    let mut last_tick = Instant::now();

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state, &machine)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Char('s')) | (_, KeyCode::Char(' ')) => {
                        let _ = cmd_tx.send(UiCommand::StartAll);
                    }
                    (_, KeyCode::Char('x')) | (_, KeyCode::Enter) => {
                        let _ = cmd_tx.send(UiCommand::StopAll);
                        state.info = "Stopping…".into();
                    }
                    (_, KeyCode::Char(c @ '1'..='9')) => {
                        let idx = (c as usize) - ('1' as usize);
                        if idx < plan.wheels {
                            let _ = cmd_tx.send(UiCommand::Toggle(idx));
                        }
                    }
                    (_, KeyCode::Char('+')) | (_, KeyCode::Char('=')) => {
                        let _ = cmd_tx.send(UiCommand::Faster);
                        state.info = "Faster".into();
                    }
                    (_, KeyCode::Char('-')) => {
                        let _ = cmd_tx.send(UiCommand::Slower);
                        state.info = "Slower".into();
                    }
                    (_, KeyCode::Tab) => {
                        state.tab = (state.tab + 1) % 3;
                    }
                    (_, KeyCode::Char('?')) => {
                        state.tab = 2;
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState, machine: &Machine) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Reels"), Line::from("Log"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("slot-wheel"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_reels(chunks[1], f, state, machine),
        1 => draw_log(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }
}

fn draw_reels(area: Rect, f: &mut ratatui::Frame, state: &UiState, machine: &Machine) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)].as_ref())
        .split(area);

    let n = machine.surfaces.len().max(1) as u32;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, n); n as usize])
        .split(rows[0]);

    for (i, (surface, view)) in machine.surfaces.iter().zip(&state.wheels).enumerate() {
        reel::draw_reel(
            columns[i],
            f,
            i,
            &machine.strip,
            &machine.geometry,
            surface.offset(),
            view,
        );
    }

    let status = Paragraph::new(Line::from(vec![
        Span::styled(
            state.info.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   spins: "),
        Span::styled(state.spins.to_string(), Style::default().fg(Color::Cyan)),
        Span::raw("  jackpots: "),
        Span::styled(state.jackpots.to_string(), Style::default().fg(Color::Yellow)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Payline"));
    f.render_widget(status, rows[1]);
}

fn draw_log(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = state.log.len().saturating_sub(visible);
    let lines: Vec<Line> = state
        .log
        .iter()
        .skip(skip)
        .map(|l| Line::from(l.as_str()))
        .collect();
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Events"));
    f.render_widget(p, area);
}
