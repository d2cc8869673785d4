use std::cmp::Ordering;

use ratatui::prelude::*;

use crate::color::RgbColor;
use crate::plot::canvas::{Canvas, TextBaseline};

/// Braille dot positions within a 2x4 cell:
/// (0,0)=0x01 (1,0)=0x08
/// (0,1)=0x02 (1,1)=0x10
/// (0,2)=0x04 (1,2)=0x20
/// (0,3)=0x40 (1,3)=0x80
pub const DOT_MAP: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40],
    [0x08, 0x10, 0x20, 0x80],
];

pub const DOTS_X: usize = 2;
pub const DOTS_Y: usize = 4;

/// One terminal character cell of an encoded canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrailleCell {
    pub ch: char,
    /// `None` for cells with nothing drawn
    pub color: Option<RgbColor>,
}

impl Default for BrailleCell {
    fn default() -> Self {
        Self { ch: ' ', color: None }
    }
}

/// A pixel canvas encoded as terminal characters.
///
/// Each cell packs a 2x4 block of pixels into one braille glyph. Several
/// colors can land in one block but a cell has a single foreground, so the
/// most prominent one wins. Text labels are placed over the glyphs as plain
/// characters.
#[derive(Debug, Clone, PartialEq)]
pub struct BrailleGrid {
    pub cols: usize,
    pub rows: usize,
    cells: Vec<BrailleCell>,
}

impl BrailleGrid {
    /// Canvas size in pixels that exactly fills `cols` x `rows` cells.
    pub fn canvas_size(cols: u16, rows: u16) -> (usize, usize) {
        (cols as usize * DOTS_X, rows as usize * DOTS_Y)
    }

    pub fn from_canvas(canvas: &Canvas) -> Self {
        let cols = canvas.width.div_ceil(DOTS_X);
        let rows = canvas.height.div_ceil(DOTS_Y);
        let mut grid = Self {
            cols,
            rows,
            cells: vec![BrailleCell::default(); cols * rows],
        };

        for cy in 0..rows {
            for cx in 0..cols {
                let mut braille: u8 = 0;
                let mut color: Option<RgbColor> = None;

                for (dx, col) in DOT_MAP.iter().enumerate() {
                    for (dy, &bit) in col.iter().enumerate() {
                        let Some(px) = canvas.get_pixel(cx * DOTS_X + dx, cy * DOTS_Y + dy) else {
                            continue;
                        };
                        braille |= bit;
                        color = Some(match color {
                            Some(best) if more_prominent(best, px) => best,
                            _ => px,
                        });
                    }
                }

                if braille != 0 {
                    grid.cells[cy * cols + cx] = BrailleCell {
                        ch: char::from_u32(0x2800 + braille as u32).unwrap_or(' '),
                        color,
                    };
                }
            }
        }

        for label in &canvas.labels {
            let len = label.text.chars().count() as isize;
            let col = (label.x / DOTS_X as f64).floor() as isize;
            let start = col - len / 2;
            let row = match label.baseline {
                TextBaseline::Top => (label.y / DOTS_Y as f64).ceil(),
                TextBaseline::Middle => (label.y / DOTS_Y as f64).floor(),
            } as isize;
            for (i, ch) in label.text.chars().enumerate() {
                grid.set(start + i as isize, row, BrailleCell { ch, color: Some(label.color) });
            }
        }

        grid
    }

    fn set(&mut self, col: isize, row: isize, cell: BrailleCell) {
        if col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows {
            self.cells[row as usize * self.cols + col as usize] = cell;
        }
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&BrailleCell> {
        (col < self.cols && row < self.rows).then(|| &self.cells[row * self.cols + col])
    }

    /// Write the drawn cells into the frame buffer; blank cells are left as they are.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = self.rows.min(area.height as usize);
        let cols = self.cols.min(area.width as usize);
        for cy in 0..rows {
            for cx in 0..cols {
                let Some(&BrailleCell { ch, color: Some(color) }) = self.cell(cx, cy) else {
                    continue;
                };
                let (r, g, b) = color.tuple();
                let cell = frame
                    .buffer_mut()
                    .cell_mut((area.x + cx as u16, area.y + cy as u16));
                if let Some(cell) = cell {
                    cell.set_char(ch);
                    cell.set_fg(Color::Rgb(r, g, b));
                }
            }
        }
    }

    /// Plain text rows, trailing blanks trimmed.
    pub fn lines(&self) -> Vec<String> {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| {
                let line: String = row.iter().map(|c| c.ch).collect();
                line.trim_end().to_string()
            })
            .collect()
    }
}

fn more_prominent(a: RgbColor, b: RgbColor) -> bool {
    a.prominence().partial_cmp(&b.prominence()) == Some(Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: RgbColor = RgbColor::new(220, 30, 30);
    const GRAY: RgbColor = RgbColor::new(128, 128, 128);

    #[test]
    fn test_dots_pack_into_one_glyph() {
        let mut canvas = Canvas::new(4, 8);
        canvas.put_pixel(0, 0, GRAY);
        canvas.put_pixel(1, 3, RED);

        let grid = BrailleGrid::from_canvas(&canvas);
        assert_eq!((grid.cols, grid.rows), (2, 2));
        let cell = grid.cell(0, 0).unwrap();
        assert_eq!(cell.ch, char::from_u32(0x2800 + 0x01 + 0x80).unwrap());
        assert_eq!(cell.color, Some(RED));
        assert_eq!(grid.cell(1, 1), Some(&BrailleCell::default()));
    }

    #[test]
    fn test_labels_overwrite_dots() {
        let mut canvas = Canvas::new(20, 8);
        canvas.line(0.0, 1.0, 19.0, 1.0, 1.0, GRAY);
        canvas.fill_text("90°", 10.0, 2.0, RED, TextBaseline::Middle);

        let grid = BrailleGrid::from_canvas(&canvas);
        let lines = grid.lines();
        assert_eq!(lines.len(), 2);
        let row: Vec<char> = lines[0].chars().collect();
        assert_eq!(&row[4..7], &['9', '0', '°']);
        assert_eq!(grid.cell(4, 0).and_then(|c| c.color), Some(RED));
        assert_eq!(lines[1], "");
    }

    #[test]
    fn test_offscreen_labels_are_clipped() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_text("1000", 4.0, 0.0, RED, TextBaseline::Top);
        canvas.fill_text("x", -10.0, -10.0, RED, TextBaseline::Top);
        let grid = BrailleGrid::from_canvas(&canvas);
        assert_eq!(grid.lines(), vec!["10".to_string()]);
    }
}
