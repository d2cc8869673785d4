use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::time::Duration;
use tracing::{debug, info};

use super::braille::{BrailleGrid, DOTS_X, DOTS_Y};
use super::panel::{render_panel, Field, PanelState, PANEL_WIDTH};
use crate::config::Config;
use crate::materials;
use crate::model::{Plane, Variable};
use crate::session::Session;

pub async fn run(config: Config) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Plot on the left, form panel on the right.
fn split(area: Rect) -> (Rect, Rect) {
    let [plot, panel] = Layout::horizontal([Constraint::Min(10), Constraint::Length(PANEL_WIDTH)]).areas(area);
    (plot, panel)
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, config: Config) -> Result<()> {
    let size = terminal.size()?;
    let (plot_area, _) = split(Rect::new(0, 0, size.width, size.height));
    let (width, height) = BrailleGrid::canvas_size(plot_area.width, plot_area.height);
    let (mut session, mut rx) = super::start_session(&config, width, height);
    let mut panel = PanelState::default();

    let tick = Duration::from_millis(33);

    loop {
        while let Ok(event) = rx.try_recv() {
            session.handle_event(event);
        }

        let size = terminal.size()?;
        let (plot_area, panel_area) = split(Rect::new(0, 0, size.width, size.height));
        let (width, height) = BrailleGrid::canvas_size(plot_area.width, plot_area.height);
        let geometry = session.plot.geometry;
        if (geometry.width, geometry.height) != (width, height) {
            debug!("Plot resized to {}x{} dots", width, height);
            session.plot.resize(width, height);
        }

        let grid = BrailleGrid::from_canvas(session.plot.visible());

        terminal.draw(|frame| {
            let area = frame.area();

            // Clear with transparent/reset background for terminal transparency support
            let block = ratatui::widgets::Block::default().style(Style::default().bg(Color::Reset));
            frame.render_widget(block, area);

            grid.render(frame, plot_area);
            render_panel(frame, panel_area, &session, &panel);
            render_help(frame, plot_area);
        })?;

        if event::poll(tick)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(&mut session, &mut panel, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse(&mut session, plot_area, mouse),
                _ => {}
            }
        }
    }

    info!("Quitting");
    Ok(())
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: isize) -> T {
    let len = all.len() as isize;
    let i = all.iter().position(|v| *v == current).unwrap_or(0) as isize;
    all[(i + step).rem_euclid(len) as usize]
}

fn current_text(session: &Session, field: Field) -> String {
    match field {
        Field::Matrix { row, col } => session.form.cell(row, col).to_string(),
        Field::Density => session.form.density.clone(),
        Field::Angle => session.plot.angle_text.clone(),
        _ => String::new(),
    }
}

fn commit(session: &mut Session, field: Field, text: &str) {
    match field {
        Field::Matrix { row, col } => {
            if let Err(e) = session.edit_stiffness(row, col, text) {
                session.status = Some(e.to_string());
            }
        }
        Field::Density => session.edit_density(text),
        Field::Angle => {
            session.plot.set_angle_text(text);
        }
        _ => {}
    }
}

/// Left/Right (and Up/Down in the matrix) on the focused field.
fn navigate(session: &mut Session, panel: &mut PanelState, code: KeyCode) {
    let step: isize = match code {
        KeyCode::Left | KeyCode::Up => -1,
        _ => 1,
    };
    let vertical = matches!(code, KeyCode::Up | KeyCode::Down);

    match panel.focus {
        Field::Matrix { .. } if vertical => panel.focus = panel.focus.step_cell(step, 0),
        Field::Matrix { .. } => panel.focus = panel.focus.step_cell(0, step),
        _ if vertical => {
            panel.focus = if step < 0 { panel.focus.prev() } else { panel.focus.next() };
        }
        Field::Angle => session.plot.nudge_angle(step as f64),
        Field::Symmetry => {
            let symmetry = if step < 0 {
                session.form.symmetry.prev()
            } else {
                session.form.symmetry.next()
            };
            session.choose_symmetry(symmetry);
        }
        Field::Material => {
            let name = materials::step_material(session.form.material.as_deref(), step);
            session.choose_material(Some(name));
        }
        Field::Plane => {
            let plane = cycle(Plane::all(), session.plot.selection.plane, step);
            session.plot.set_plane(plane);
        }
        Field::Variable => {
            let variable = cycle(Variable::all(), session.plot.selection.variable, step);
            session.plot.set_variable(variable);
        }
        Field::Density => {}
    }
}

/// Returns true when the user asked to quit.
fn handle_key(session: &mut Session, panel: &mut PanelState, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if panel.editing.is_some() {
        match key.code {
            KeyCode::Enter => {
                let text = panel.editing.take().unwrap_or_default();
                commit(session, panel.focus, &text);
            }
            KeyCode::Esc => panel.editing = None,
            KeyCode::Backspace => {
                if let Some(buffer) = panel.editing.as_mut() {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(buffer) = panel.editing.as_mut() {
                    buffer.push(c);
                }
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Tab => panel.focus = panel.focus.next(),
        KeyCode::BackTab => panel.focus = panel.focus.prev(),
        KeyCode::Char('p') => {
            let plane = cycle(Plane::all(), session.plot.selection.plane, 1);
            session.plot.set_plane(plane);
        }
        KeyCode::Char('v') => {
            let variable = cycle(Variable::all(), session.plot.selection.variable, 1);
            session.plot.set_variable(variable);
        }
        KeyCode::Enter if panel.focus.is_text() => {
            panel.editing = Some(current_text(session, panel.focus));
        }
        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => navigate(session, panel, key.code),
        // Typing a number starts a fresh edit
        KeyCode::Char(c) if panel.focus.is_text() && (c.is_ascii_digit() || matches!(c, '-' | '.' | ',')) => {
            panel.editing = Some(c.to_string());
        }
        _ => {}
    }
    false
}

/// Pointer position in plot dots, at the center of the terminal cell.
fn to_dots(plot_area: Rect, column: u16, row: u16) -> (f64, f64) {
    let x = (column as f64 - plot_area.x as f64) * DOTS_X as f64 + DOTS_X as f64 / 2.0;
    let y = (row as f64 - plot_area.y as f64) * DOTS_Y as f64 + DOTS_Y as f64 / 2.0;
    (x, y)
}

fn handle_mouse(session: &mut Session, plot_area: Rect, mouse: MouseEvent) {
    let (x, y) = to_dots(plot_area, mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if plot_area.contains(Position::new(mouse.column, mouse.row)) => {
            session.plot.begin_drag(x, y);
        }
        MouseEventKind::Drag(MouseButton::Left) => session.plot.drag_to(x, y),
        MouseEventKind::Up(MouseButton::Left) => session.plot.end_drag(),
        _ => {}
    }
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = " [Tab] field | [Enter] edit | [←→] change | [p]lane | [v]ariable | [q]uit ";

    for (i, ch) in help.chars().enumerate() {
        if i < area.width as usize {
            let cell = frame.buffer_mut().cell_mut((area.x + i as u16, area.y));
            if let Some(cell) = cell {
                cell.set_char(ch);
                cell.set_fg(Color::DarkGray);
            }
        }
    }
}
