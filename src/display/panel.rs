//! Side panel: the material form, the view selection and the sampled outputs.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};

use crate::color::RgbColor;
use crate::form::{format_number, MaterialForm, MATRIX_SIZE};
use crate::model::{Matrix3, Plane, Variable};
use crate::session::Session;

pub const PANEL_WIDTH: u16 = 56;
const CELL_WIDTH: usize = 7;

/// Focusable panel fields, in Tab order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field {
    Matrix { row: usize, col: usize },
    Density,
    Symmetry,
    Material,
    #[default]
    Angle,
    Plane,
    Variable,
}

impl Field {
    pub fn next(&self) -> Self {
        match self {
            Field::Matrix { .. } => Field::Density,
            Field::Density => Field::Symmetry,
            Field::Symmetry => Field::Material,
            Field::Material => Field::Angle,
            Field::Angle => Field::Plane,
            Field::Plane => Field::Variable,
            Field::Variable => Field::Matrix { row: 0, col: 0 },
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Field::Matrix { .. } => Field::Variable,
            Field::Density => Field::Matrix { row: 0, col: 0 },
            Field::Symmetry => Field::Density,
            Field::Material => Field::Symmetry,
            Field::Angle => Field::Material,
            Field::Plane => Field::Angle,
            Field::Variable => Field::Plane,
        }
    }

    /// Fields that take typed text.
    pub fn is_text(&self) -> bool {
        match self {
            Field::Matrix { row, col } => MaterialForm::is_editable(*row, *col),
            Field::Density | Field::Angle => true,
            _ => false,
        }
    }

    /// Move the matrix cursor, staying inside the grid.
    pub fn step_cell(&self, d_row: isize, d_col: isize) -> Self {
        match *self {
            Field::Matrix { row, col } => {
                let clamp = |v: usize, d: isize| (v as isize + d).clamp(0, MATRIX_SIZE as isize - 1) as usize;
                Field::Matrix {
                    row: clamp(row, d_row),
                    col: clamp(col, d_col),
                }
            }
            other => other,
        }
    }
}

/// Focus and the text being typed, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub focus: Field,
    pub editing: Option<String>,
}

fn fg(color: RgbColor) -> Style {
    let (r, g, b) = color.tuple();
    Style::default().fg(Color::Rgb(r, g, b))
}

/// Polarization entry as the backend sent it; zero (of either sign) shows as `0`.
pub fn format_matrix_entry(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format_number(value)
    }
}

pub fn format_matrix(a: &Matrix3) -> Vec<String> {
    a.iter()
        .map(|row| {
            let entries: Vec<String> = row.iter().map(|v| format_matrix_entry(*v)).collect();
            format!("[{}]", entries.join(" "))
        })
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

struct Painter<'a> {
    state: &'a PanelState,
}

impl Painter<'_> {
    fn style(&self, field: Field) -> Style {
        if self.state.focus == field {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        }
    }

    /// Field text, or the edit buffer with a cursor while it is being typed.
    fn value(&self, field: Field, text: &str) -> String {
        match (&self.state.editing, self.state.focus == field) {
            (Some(buffer), true) => format!("{}▏", buffer),
            _ => text.to_string(),
        }
    }

    fn row(&self, label: &str, field: Field, value: String) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:<16}", label), Style::default().fg(Color::Gray)),
            Span::styled(value, self.style(field)),
        ])
    }

    fn radio<T: PartialEq + Copy>(&self, label: &str, field: Field, options: &[(T, &str)], current: T) -> Line<'static> {
        let mut spans = vec![Span::styled(format!("{:<16}", label), Style::default().fg(Color::Gray))];
        for (value, name) in options {
            let mark = if *value == current { "(•)" } else { "( )" };
            spans.push(Span::styled(format!("{} {} ", mark, name), self.style(field)));
        }
        Line::from(spans)
    }
}

pub fn render_panel(frame: &mut Frame, area: Rect, session: &Session, state: &PanelState) {
    let painter = Painter { state };
    let form = &session.form;
    let plot = &session.plot;
    let style = &plot.style;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::styled("Stiffness C (GPa)", Style::default().add_modifier(Modifier::BOLD)));
    for row in 0..MATRIX_SIZE {
        let mut spans = Vec::with_capacity(MATRIX_SIZE);
        for col in 0..MATRIX_SIZE {
            let field = Field::Matrix { row, col };
            let text = truncate(&painter.value(field, form.cell(row, col)), CELL_WIDTH - 1);
            let mut cell_style = painter.style(field);
            if !MaterialForm::is_editable(row, col) {
                cell_style = cell_style.fg(Color::DarkGray);
            }
            spans.push(Span::styled(format!("{:>width$}", text, width = CELL_WIDTH), cell_style));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::default());

    lines.push(painter.row("Density (kg/m³)", Field::Density, painter.value(Field::Density, &form.density)));
    lines.push(painter.row("Symmetry", Field::Symmetry, format!("◂ {} ▸", form.symmetry)));
    let material = form.material.as_deref().unwrap_or("-");
    lines.push(painter.row("Material", Field::Material, format!("◂ {} ▸", material)));
    lines.push(Line::default());

    lines.push(painter.row("Angle (°)", Field::Angle, painter.value(Field::Angle, &plot.angle_text)));
    let planes: Vec<(Plane, &str)> = Plane::all().iter().map(|p| (*p, p.name())).collect();
    lines.push(painter.radio("Plane", Field::Plane, &planes, plot.selection.plane));
    let variables: Vec<(Variable, &str)> = Variable::all()
        .iter()
        .map(|v| {
            let short = match v {
                Variable::Velocity => "velocity",
                Variable::Slowness => "slowness",
                Variable::GroupVelocity => "group",
            };
            (*v, short)
        })
        .collect();
    lines.push(painter.radio("Show", Field::Variable, &variables, plot.selection.variable));
    lines.push(Line::default());

    lines.push(Line::styled(
        plot.selection.variable.label(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    let values = plot.outputs().unwrap_or_else(|| [(); 3].map(|_| "-".to_string()));
    let mut spans = Vec::new();
    for (value, color) in values.iter().zip(style.mode_colors) {
        spans.push(Span::styled("  ■ ", fg(color)));
        spans.push(Span::raw(format!("{:<10}", value)));
    }
    lines.push(Line::from(spans));
    lines.push(Line::default());

    lines.push(Line::styled("Polarization A", Style::default().add_modifier(Modifier::BOLD)));
    for row in format_matrix(&plot.selection.a) {
        lines.push(Line::raw(format!("  {}", row)));
    }
    lines.push(Line::default());

    if session.is_loading() {
        lines.push(Line::styled("⟳ loading…", Style::default().fg(Color::Yellow)));
    }
    if let Some(ref status) = session.status {
        lines.push(Line::styled(status.clone(), Style::default().fg(Color::Red)));
    }
    if let Some(ref e) = plot.last_error {
        lines.push(Line::styled(e.to_string(), Style::default().fg(Color::Red)));
    }

    let block = Block::bordered().title(" anisoplot ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
