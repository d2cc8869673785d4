//! Polar-plot engine.
//!
//! [`PlotContext`] owns everything the plot needs between events: the style,
//! the geometry and offscreen guide for the current canvas size, the visible
//! canvas, the selection and drag state, and the response cache. Every
//! mutation handler finishes by sampling the cached grid and redrawing.

pub mod canvas;
pub mod foreground;
pub mod guide;
pub mod sampling;

use std::f64::consts::TAU;

use tracing::{debug, warn};

use crate::angle::{format_degrees, normalize_polar_angle_radians, parse_polar_angle};
use crate::backend::cache::ResponseCache;
use crate::color::RgbColor;
use crate::model::{DragState, Plane, ResponseGrid, SelectionState, Variable};
use canvas::Canvas;
use guide::PlotGeometry;
use sampling::SampleError;

/// Drawing parameters that do not depend on the canvas size.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    /// Text height in canvas pixels
    pub font_size: f64,
    pub angle_guides: usize,
    pub point_radius: f64,
    pub ray_width: f64,
    pub guide_color: RgbColor,
    pub axis_color: RgbColor,
    pub label_color: RgbColor,
    pub mode_colors: [RgbColor; 3],
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            font_size: 4.0,
            angle_guides: 8,
            point_radius: 1.5,
            ray_width: 2.0,
            guide_color: RgbColor::new(90, 90, 90),
            axis_color: RgbColor::new(220, 220, 220),
            label_color: RgbColor::new(160, 160, 160),
            mode_colors: [
                RgbColor::new(230, 80, 80),
                RgbColor::new(90, 200, 90),
                RgbColor::new(100, 150, 255),
            ],
        }
    }
}

/// Selection derived from the angle field text and the checked radio buttons.
/// Unparseable angle text selects 0°.
pub fn initial_selection(angle_text: &str, plane: Plane, variable: Variable) -> SelectionState {
    let degrees = parse_polar_angle(angle_text).unwrap_or(0.0);
    SelectionState::new(normalize_polar_angle_radians(degrees), plane, variable)
}

pub struct PlotContext {
    pub style: PlotStyle,
    pub geometry: PlotGeometry,
    offscreen: Canvas,
    visible: Canvas,
    pub selection: SelectionState,
    pub drag: DragState,
    /// Text shown in the angle field
    pub angle_text: String,
    last_valid_angle_text: String,
    pub cache: ResponseCache,
    /// Why the last redraw showed no curves, if it failed
    pub last_error: Option<SampleError>,
    /// Whether the last successful sample is reflected in `selection`
    pub sampled: bool,
}

impl PlotContext {
    pub fn new(style: PlotStyle, width: usize, height: usize, angle_text: &str, plane: Plane, variable: Variable) -> Self {
        let mut offscreen = Canvas::new(width, height);
        let geometry = guide::draw_background(&mut offscreen, width, height, &style);
        let mut visible = Canvas::new(width, height);
        visible.blit(&offscreen);

        let angle_text = if parse_polar_angle(angle_text).is_some() {
            angle_text.to_string()
        } else {
            "0".to_string()
        };

        Self {
            selection: initial_selection(&angle_text, plane, variable),
            style,
            geometry,
            offscreen,
            visible,
            drag: DragState::default(),
            last_valid_angle_text: angle_text.clone(),
            angle_text,
            cache: ResponseCache::default(),
            last_error: None,
            sampled: false,
        }
    }

    /// The composed plot as of the last redraw.
    pub fn visible(&self) -> &Canvas {
        &self.visible
    }

    /// Commit angle field text. Unparseable text restores the previous field
    /// value and leaves the selection untouched; returns whether it parsed.
    pub fn set_angle_text(&mut self, text: &str) -> bool {
        let Some(degrees) = parse_polar_angle(text) else {
            debug!("Rejected angle text {:?}", text);
            self.angle_text = self.last_valid_angle_text.clone();
            return false;
        };

        self.angle_text = format!("{}", degrees);
        self.last_valid_angle_text = self.angle_text.clone();
        self.selection.angle = normalize_polar_angle_radians(degrees);
        self.update();
        true
    }

    /// Rotate the selection by `delta` degrees, keeping the field in `[0, 360)`.
    pub fn nudge_angle(&mut self, delta: f64) {
        let degrees = self.selection.angle.to_degrees() + delta;
        let degrees = ((degrees * 100.0).round() / 100.0).rem_euclid(360.0);
        self.set_angle_text(&format!("{}", degrees));
    }

    pub fn begin_drag(&mut self, x: f64, y: f64) {
        self.drag.is_rotating = true;
        self.drag_to(x, y);
    }

    /// Point the selection at canvas position (x, y) while a drag is active.
    pub fn drag_to(&mut self, x: f64, y: f64) {
        if !self.drag.is_rotating {
            return;
        }
        let (cx, cy) = self.geometry.center();
        let angle = sampling::ray_angle(x - cx, y - cy).rem_euclid(TAU);
        self.selection.angle = angle;
        self.angle_text = format_degrees(angle);
        self.last_valid_angle_text = self.angle_text.clone();
        self.update();
    }

    pub fn end_drag(&mut self) {
        self.drag.is_rotating = false;
    }

    pub fn set_plane(&mut self, plane: Plane) {
        self.selection.plane = plane;
        self.update();
    }

    pub fn set_variable(&mut self, variable: Variable) {
        self.selection.variable = variable;
        self.update();
    }

    /// Rebuild geometry and the offscreen guide for a new canvas size.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.geometry = guide::draw_background(&mut self.offscreen, width, height, &self.style);
        self.update();
    }

    /// Store a fetched grid if `seq` is newer than the one shown, then redraw.
    pub fn apply_grid(&mut self, seq: u64, grid: ResponseGrid) -> bool {
        if !self.cache.store(seq, grid) {
            return false;
        }
        self.update();
        true
    }

    /// Sample the cached grid at the selection and redraw the visible canvas.
    pub fn update(&mut self) {
        let grid = self.cache.grid();

        let drawn = match grid.map(|g| sampling::sample(&self.selection, g)) {
            None => None,
            Some(Ok(sample)) => {
                debug!("Sampled index {}", sample.index);
                self.selection.r = sample.r;
                self.selection.a = sample.a;
                self.last_error = None;
                self.sampled = true;
                grid
            }
            Some(Err(e)) => {
                warn!("Sampling failed: {}", e);
                self.last_error = Some(e);
                self.sampled = false;
                None
            }
        };

        foreground::render(
            &mut self.visible,
            &self.offscreen,
            &self.geometry,
            &self.style,
            &self.selection,
            drawn,
        );
    }

    /// Formatted per-mode values, once a sample has been taken.
    pub fn outputs(&self) -> Option<[String; 3]> {
        self.sampled.then(|| self.selection.formatted_values())
    }
}
