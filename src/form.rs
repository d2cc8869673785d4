//! Material input form: the symmetric 6×6 stiffness matrix, density,
//! symmetry class and material name.
//!
//! Cells hold the raw text the user typed; numbers are derived on demand
//! with the same lenient prefix parsing the angle field uses.

use thiserror::Error;

use crate::angle::parse_float_prefix;
use crate::materials::Symmetry;

/// Elastic constants in GPa, row-major.
pub type StiffnessMatrix = [[f64; 6]; 6];

pub const MATRIX_SIZE: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("cell ({row}, {col}) mirrors ({col}, {row}); edit the upper triangle")]
    NotEditable { row: usize, col: usize },
    #[error("cell ({row}, {col}) is outside the 6x6 matrix")]
    OutOfRange { row: usize, col: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialForm {
    cells: [[String; MATRIX_SIZE]; MATRIX_SIZE],
    pub density: String,
    pub symmetry: Symmetry,
    /// Material picked or detected; `None` when the constants match no catalog entry
    pub material: Option<String>,
}

impl Default for MaterialForm {
    fn default() -> Self {
        Self::new(&[[0.0; MATRIX_SIZE]; MATRIX_SIZE], 0.0)
    }
}

/// Render a number the way the form shows it: no trailing zeros.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

impl MaterialForm {
    pub fn new(c: &StiffnessMatrix, density: f64) -> Self {
        Self {
            cells: c.map(|row| row.map(format_number)),
            density: format_number(density),
            symmetry: Symmetry::default(),
            material: None,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether (row, col) accepts input. The lower triangle only mirrors.
    pub fn is_editable(row: usize, col: usize) -> bool {
        row <= col && col < MATRIX_SIZE
    }

    /// Set an upper-triangle cell and its mirror below the diagonal.
    pub fn edit_cell(&mut self, row: usize, col: usize, text: &str) -> Result<(), FormError> {
        if row >= MATRIX_SIZE || col >= MATRIX_SIZE {
            return Err(FormError::OutOfRange { row, col });
        }
        if !Self::is_editable(row, col) {
            return Err(FormError::NotEditable { row, col });
        }
        self.cells[row][col] = text.to_string();
        self.cells[col][row] = text.to_string();
        Ok(())
    }

    /// Stiffness constants; cells that do not start with a number count as 0.
    pub fn stiffness(&self) -> StiffnessMatrix {
        self.cells
            .each_ref()
            .map(|row| row.each_ref().map(|cell| parse_float_prefix(cell).unwrap_or(0.0)))
    }

    pub fn density_value(&self) -> f64 {
        parse_float_prefix(&self.density).unwrap_or(0.0)
    }

    /// Overwrite the cells the backend sent. A `None` or missing entry leaves
    /// the current text; an explicit zero is written like any other value.
    pub fn fill(&mut self, c: &[Vec<Option<f64>>]) {
        for (row, values) in c.iter().take(MATRIX_SIZE).enumerate() {
            for (col, value) in values.iter().take(MATRIX_SIZE).enumerate() {
                if let Some(v) = value {
                    self.cells[row][col] = format_number(*v);
                }
            }
        }
    }

    pub fn set_density(&mut self, density: f64) {
        self.density = format_number(density);
    }

    /// Apply a picker choice. No choice keeps the previous material.
    pub fn choose_material(&mut self, choice: Option<&str>) -> bool {
        match choice {
            Some(name) => {
                self.material = Some(name.to_string());
                true
            }
            None => false,
        }
    }
}
