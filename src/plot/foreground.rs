//! Per-frame composition: background blit, the three mode curves, the
//! selection ray with its intersection points, and the radial value labels.

use tracing::debug;

use super::canvas::{Canvas, TextBaseline};
use super::guide::PlotGeometry;
use super::PlotStyle;
use crate::model::{ResponseGrid, SelectionState, Variable};

/// Redraw `visible` from the cached background and, when available, the
/// sampled grid.
///
/// With no grid, or a zero normalization bound for the selected curves, only
/// the background is restored.
pub fn render(
    visible: &mut Canvas,
    offscreen: &Canvas,
    geometry: &PlotGeometry,
    style: &PlotStyle,
    selection: &SelectionState,
    grid: Option<&ResponseGrid>,
) {
    if visible.width != offscreen.width || visible.height != offscreen.height {
        visible.resize(offscreen.width, offscreen.height);
    } else {
        visible.clear();
    }
    visible.blit(offscreen);

    let Some(grid) = grid else {
        return;
    };

    let max = grid.max(selection.variable, selection.plane);
    if max == 0.0 || !max.is_finite() {
        debug!("Skipping curves: {} max on {} is {}", selection.variable, selection.plane, max);
        return;
    }

    let radius = geometry.radius;
    let drawing_scale = radius / max;

    draw_curves(visible, geometry, style, selection, grid, drawing_scale);

    let (cx, cy) = geometry.center();
    let angle = selection.angle;
    let (ray_x, ray_y) = geometry.to_screen(radius * angle.cos(), radius * angle.sin());
    visible.line(cx, cy, ray_x, ray_y, style.ray_width, style.axis_color);

    for (mode, color) in style.mode_colors.iter().enumerate() {
        let intersection = selection.r[mode] * drawing_scale;
        let (px, py) = geometry.to_screen(intersection * angle.cos(), intersection * angle.sin());
        visible.fill_disc(px, py, style.point_radius, *color);
    }
    visible.fill_disc(cx, cy, style.point_radius, style.axis_color);

    if geometry.number_guide_circles == 0 {
        return;
    }
    let space = radius / geometry.number_guide_circles as f64;
    let label_value_step = space / drawing_scale;
    for i in 0..=geometry.number_guide_circles {
        let value = (i as f64 * label_value_step).round();
        visible.fill_text(
            format!("{}", value as i64),
            cx + i as f64 * space,
            cy + geometry.font_size,
            style.label_color,
            TextBaseline::Top,
        );
    }
}

fn draw_curves(
    visible: &mut Canvas,
    geometry: &PlotGeometry,
    style: &PlotStyle,
    selection: &SelectionState,
    grid: &ResponseGrid,
    drawing_scale: f64,
) {
    let plane = selection.plane;
    let (xi, yi) = plane.projection();

    for (mode, color) in style.mode_colors.iter().enumerate() {
        let points: Vec<(f64, f64)> = match selection.variable {
            Variable::GroupVelocity => grid
                .rays(plane)
                .iter()
                .map(|ray| (ray[mode][xi] * drawing_scale, ray[mode][yi] * drawing_scale))
                .collect(),
            variable => grid
                .magnitudes(variable, plane)
                .unwrap_or_default()
                .iter()
                .zip(&grid.t)
                .map(|(values, t)| {
                    let r = values[mode] * drawing_scale;
                    (r * t.cos(), r * t.sin())
                })
                .collect(),
        };

        for pair in points.windows(2) {
            let (x0, y0) = geometry.to_screen(pair[0].0, pair[0].1);
            let (x1, y1) = geometry.to_screen(pair[1].0, pair[1].1);
            visible.line(x0, y0, x1, y1, 1.0, *color);
        }
    }
}
