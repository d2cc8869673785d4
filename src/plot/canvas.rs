//! Owned RGBA pixel buffer with the drawing primitives the polar plot needs.
//!
//! Text is not rasterized: labels are kept as positioned strings alongside
//! the pixels and are placed as whole characters by the output backend.

use crate::color::RgbColor;

/// Vertical anchoring of a text label relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Middle,
}

/// A string centered horizontally on a pixel position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: RgbColor,
    pub baseline: TextBaseline,
}

/// Owned RGBA pixel buffer.
///
/// Internal format is 4 bytes per pixel in **RGBA** order. Alpha is either
/// 0 (untouched) or 255; the plot never blends.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub labels: Vec<TextLabel>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0u8; width * height * 4],
            width,
            height,
            labels: Vec::new(),
        }
    }

    /// Resize and clear the canvas.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width * height * 4, 0);
        self.labels.clear();
    }

    /// Clear to fully transparent and drop all labels.
    #[inline]
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.labels.clear();
    }

    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, color: RgbColor) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y * self.width + x) * 4;
        self.data[idx] = color.r;
        self.data[idx + 1] = color.g;
        self.data[idx + 2] = color.b;
        self.data[idx + 3] = 255;
    }

    /// Color at (x, y), or `None` if nothing was drawn there.
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<RgbColor> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        (self.data[idx + 3] != 0)
            .then(|| RgbColor::new(self.data[idx], self.data[idx + 1], self.data[idx + 2]))
    }

    /// Plot a pixel given signed coordinates, ignoring anything off-canvas.
    #[inline]
    fn plot(&mut self, x: isize, y: isize, color: RgbColor) {
        if x >= 0 && y >= 0 {
            self.put_pixel(x as usize, y as usize, color);
        }
    }

    /// Copy `source` over this canvas, pixels and labels alike.
    pub fn blit(&mut self, source: &Canvas) {
        if source.width == self.width && source.height == self.height {
            self.data.copy_from_slice(&source.data);
        } else {
            let w = self.width.min(source.width);
            for y in 0..self.height.min(source.height) {
                let dst = y * self.width * 4;
                let src = y * source.width * 4;
                self.data[dst..dst + w * 4].copy_from_slice(&source.data[src..src + w * 4]);
            }
        }
        self.labels.extend(source.labels.iter().cloned());
    }

    /// Stroke a straight segment. Widths above one are stamped with a disc.
    ///
    /// The segment is clipped to the canvas (plus the brush margin) first, so
    /// far off-canvas endpoints cost nothing.
    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, width: f64, color: RgbColor) {
        let brush = ((width - 1.0) / 2.0).max(0.0);
        let margin = brush.ceil() + 1.0;
        let min = (-margin, -margin);
        let max = (self.width as f64 + margin, self.height as f64 + margin);
        let Some(((x0, y0), (x1, y1))) = clip_segment((x0, y0), (x1, y1), min, max) else {
            return;
        };

        let mut x0 = x0.round() as isize;
        let mut y0 = y0.round() as isize;
        let x1 = x1.round() as isize;
        let y1 = y1.round() as isize;

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx: isize = if x0 < x1 { 1 } else { -1 };
        let sy: isize = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if brush > 0.0 {
                self.fill_disc(x0 as f64, y0 as f64, brush, color);
            } else {
                self.plot(x0, y0, color);
            }

            if x0 == x1 && y0 == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Stroke a circle outline of the given radius.
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, color: RgbColor) {
        if radius <= 0.0 {
            self.plot(cx.round() as isize, cy.round() as isize, color);
            return;
        }
        let steps = ((radius * std::f64::consts::TAU).ceil() as usize).max(8) * 2;
        for step in 0..steps {
            let angle = step as f64 / steps as f64 * std::f64::consts::TAU;
            let px = (cx + angle.cos() * radius).round() as isize;
            let py = (cy - angle.sin() * radius).round() as isize;
            self.plot(px, py, color);
        }
    }

    /// Fill a disc of the given radius.
    pub fn fill_disc(&mut self, cx: f64, cy: f64, radius: f64, color: RgbColor) {
        let r2 = radius * radius;
        let x_min = (cx - radius).floor() as isize;
        let x_max = (cx + radius).ceil() as isize;
        let y_min = (cy - radius).floor() as isize;
        let y_max = (cy + radius).ceil() as isize;
        for y in y_min..=y_max {
            for x in x_min..=x_max {
                let ddx = x as f64 - cx;
                let ddy = y as f64 - cy;
                if ddx * ddx + ddy * ddy <= r2 + 0.25 {
                    self.plot(x, y, color);
                }
            }
        }
    }

    pub fn fill_text(
        &mut self,
        text: impl Into<String>,
        x: f64,
        y: f64,
        color: RgbColor,
        baseline: TextBaseline,
    ) {
        self.labels.push(TextLabel {
            x,
            y,
            text: text.into(),
            color,
            baseline,
        });
    }
}

/// Liang-Barsky clip of the segment `p0`-`p1` to the box `min`..`max`.
fn clip_segment(p0: (f64, f64), p1: (f64, f64), min: (f64, f64), max: (f64, f64)) -> Option<((f64, f64), (f64, f64))> {
    let dx = p1.0 - p0.0;
    let dy = p1.1 - p0.1;
    if !(p0.0.is_finite() && p0.1.is_finite() && dx.is_finite() && dy.is_finite()) {
        return None;
    }

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, p0.0 - min.0), (dx, max.0 - p0.0), (-dy, p0.1 - min.1), (dy, max.1 - p0.1)] {
        if p == 0.0 {
            // Parallel to this edge and outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some(((p0.0 + t0 * dx, p0.1 + t0 * dy), (p0.0 + t1 * dx, p0.1 + t1 * dy)))
}
