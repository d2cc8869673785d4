use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

/// RGB color representation for configuration and drawing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse from hex string like "#FF0000" or "FF0000"
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// How strongly this color should win when several colors share one
    /// terminal cell: saturated colors first, then brighter ones.
    pub fn prominence(&self) -> (f32, f32) {
        let rgb = Srgb::new(self.r, self.g, self.b).into_format::<f32>();
        let hsl: Hsl = rgb.into_color();
        (hsl.saturation, hsl.lightness)
    }

    pub fn tuple(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}
