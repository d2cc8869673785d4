//! Static polar grid: angle spokes with degree labels, radius guide circles
//! and the bold outer circle. Drawn once per canvas size into the offscreen
//! buffer.

use std::f64::consts::TAU;

use tracing::debug;

use super::canvas::{Canvas, TextBaseline};
use super::PlotStyle;

/// Space reserved outside the outer circle for angle labels, in font sizes.
const LABEL_SPACE_FACTOR: f64 = 2.7;
/// Minimum distance between radius guide circles, in font sizes.
const GUIDE_SPACING_FACTOR: f64 = 3.5;

/// Geometry derived from the canvas size; immutable until the next resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotGeometry {
    pub width: usize,
    pub height: usize,
    /// Radius of the outer circle in pixels
    pub radius: f64,
    pub number_guide_circles: usize,
    pub font_size: f64,
}

impl PlotGeometry {
    pub fn compute(width: usize, height: usize, font_size: f64) -> Self {
        let max_radius = width.min(height) as f64 / 2.0;
        let label_space = LABEL_SPACE_FACTOR * font_size;
        let radius = (max_radius - label_space).max(0.0);
        let guide_label_space = GUIDE_SPACING_FACTOR * font_size;
        let number_guide_circles = if guide_label_space > 0.0 {
            (radius / guide_label_space).floor() as usize
        } else {
            0
        };

        Self {
            width,
            height,
            radius,
            number_guide_circles,
            font_size,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn label_space(&self) -> f64 {
        LABEL_SPACE_FACTOR * self.font_size
    }

    /// Screen position of a point given in plot coordinates (y up).
    #[inline]
    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        (cx + x, cy - y)
    }
}

fn degree_label(degrees: f64) -> String {
    if (degrees - degrees.round()).abs() < 1e-9 {
        format!("{}°", degrees.round() as i64)
    } else {
        format!("{:.1}°", degrees)
    }
}

/// Rebuild `offscreen` at the given size and draw the static guide into it.
pub fn draw_background(offscreen: &mut Canvas, width: usize, height: usize, style: &PlotStyle) -> PlotGeometry {
    offscreen.resize(width, height);
    let geometry = PlotGeometry::compute(width, height, style.font_size);
    let (cx, cy) = geometry.center();
    let radius = geometry.radius;
    let label_space = geometry.label_space();

    debug!(
        "Guide: {}x{} radius={:.1} circles={}",
        width, height, radius, geometry.number_guide_circles
    );

    for i in 0..style.angle_guides {
        let angle = TAU / style.angle_guides as f64 * i as f64;
        let (edge_x, edge_y) = geometry.to_screen(radius * angle.cos(), radius * angle.sin());
        offscreen.line(cx, cy, edge_x, edge_y, 1.0, style.guide_color);

        let text_x = edge_x + label_space / 2.0 * angle.cos();
        let text_y = edge_y - label_space / 2.0 * angle.sin();
        offscreen.fill_text(
            degree_label(angle.to_degrees()),
            text_x,
            text_y,
            style.label_color,
            TextBaseline::Middle,
        );
    }

    for j in 0..geometry.number_guide_circles {
        let guide_radius = radius * j as f64 / geometry.number_guide_circles as f64;
        offscreen.stroke_circle(cx, cy, guide_radius, style.guide_color);
    }

    offscreen.stroke_circle(cx, cy, radius, style.axis_color);

    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_adapts_to_font_size() {
        let g = PlotGeometry::compute(200, 120, 4.0);
        assert!((g.radius - (60.0 - 10.8)).abs() < 1e-9);
        assert_eq!(g.number_guide_circles, (49.2f64 / 14.0).floor() as usize);

        let big_font = PlotGeometry::compute(200, 120, 8.0);
        assert!(big_font.number_guide_circles < g.number_guide_circles);
    }

    #[test]
    fn test_tiny_canvas_does_not_go_negative() {
        let g = PlotGeometry::compute(6, 6, 4.0);
        assert_eq!(g.radius, 0.0);
        assert_eq!(g.number_guide_circles, 0);
    }

    #[test]
    fn test_background_has_one_label_per_spoke() {
        let style = PlotStyle::default();
        let mut offscreen = Canvas::new(0, 0);
        let geometry = draw_background(&mut offscreen, 160, 160, &style);
        assert_eq!(offscreen.labels.len(), style.angle_guides);
        assert_eq!(offscreen.labels[0].text, "0°");
        assert_eq!(offscreen.labels[2].text, "90°");
        assert_eq!(offscreen.labels[3].text, "135°");

        // Outer circle is drawn on the positive x axis in the axis color
        let (cx, cy) = geometry.center();
        let x = (cx + geometry.radius).round() as usize;
        assert_eq!(offscreen.get_pixel(x, cy as usize), Some(style.axis_color));
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let style = PlotStyle::default();
        let mut once = Canvas::new(0, 0);
        let g1 = draw_background(&mut once, 120, 90, &style);
        let mut twice = Canvas::new(0, 0);
        draw_background(&mut twice, 120, 90, &style);
        let g2 = draw_background(&mut twice, 120, 90, &style);
        assert_eq!(g1, g2);
        assert_eq!(once, twice);
    }
}
