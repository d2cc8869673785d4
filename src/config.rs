use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::color::RgbColor;
use crate::display::DisplayMode;
use crate::form::StiffnessMatrix;
use crate::materials::DEFAULT_MATERIAL;
use crate::model::{Plane, Variable};
use crate::plot::PlotStyle;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub backend: BackendConfig,
    pub plot: PlotConfig,
    pub selection: SelectionConfig,
    pub material: MaterialConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub mode: DisplayMode,
    /// Log destination while the terminal UI runs (None = cache dir)
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    /// No timeout when absent
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5000/".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlotConfig {
    /// Label height in braille dots; 4 is one text row
    pub font_size: f64,
    pub angle_guides: usize,
    pub point_radius: f64,
    pub ray_width: f64,
    pub guide_color: RgbColor,
    pub axis_color: RgbColor,
    pub label_color: RgbColor,
    pub mode_colors: [RgbColor; 3],
}

impl Default for PlotConfig {
    fn default() -> Self {
        let style = PlotStyle::default();
        Self {
            font_size: style.font_size,
            angle_guides: style.angle_guides,
            point_radius: style.point_radius,
            ray_width: style.ray_width,
            guide_color: style.guide_color,
            axis_color: style.axis_color,
            label_color: style.label_color,
            mode_colors: style.mode_colors,
        }
    }
}

impl From<&PlotConfig> for PlotStyle {
    fn from(config: &PlotConfig) -> Self {
        Self {
            font_size: config.font_size.max(0.0),
            angle_guides: config.angle_guides,
            point_radius: config.point_radius.max(0.0),
            ray_width: config.ray_width.max(1.0),
            guide_color: config.guide_color,
            axis_color: config.axis_color,
            label_color: config.label_color,
            mode_colors: config.mode_colors,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// Initial angle field text, in degrees
    pub angle: String,
    pub plane: Plane,
    pub variable: Variable,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            angle: "0".to_string(),
            plane: Plane::Xy,
            variable: Variable::Velocity,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaterialConfig {
    /// Catalog material loaded at startup; overrides `density` and `stiffness`
    pub name: Option<String>,
    /// kg/m³
    pub density: f64,
    /// GPa, row-major
    pub stiffness: Option<StiffnessMatrix>,
}

impl MaterialConfig {
    /// Catalog material to request first. Without explicit constants the
    /// viewer opens on the default material.
    pub fn startup_material(&self) -> Option<&str> {
        match (&self.name, &self.stiffness) {
            (Some(name), _) => Some(name.as_str()),
            (None, Some(_)) => None,
            (None, None) => Some(DEFAULT_MATERIAL),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Get the default XDG config path (~/.config/anisoplot/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("anisoplot").join("config.toml"))
    }

    /// Load config from the default XDG path if it exists
    /// Returns None if file doesn't exist, warns on parse errors
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return None;
        }
        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Warning: {:#}\nUsing defaults.", e);
                None
            }
        }
    }

    /// Default log file (~/.cache/anisoplot/anisoplot.log)
    pub fn default_log_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join("anisoplot").join("anisoplot.log"))
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.display.log_file.clone().or_else(Self::default_log_path)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.backend.timeout_secs.map(Duration::from_secs)
    }

    /// Initialize default config file at XDG path, returns the path
    pub fn init_default_config() -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        std::fs::write(&path, Self::generate_config_template())
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(path)
    }

    /// Generate a commented TOML config template
    pub fn generate_config_template() -> String {
        r#"# Anisoplot Configuration
# This file is auto-generated. Edit as needed.

[display]
# Display mode: "terminal" (interactive) or "print" (fetch once, print, exit)
mode = "terminal"
# Log file while the terminal UI runs (default: ~/.cache/anisoplot/anisoplot.log)
# log_file = "/tmp/anisoplot.log"

[backend]
# URL every request is POSTed to
url = "http://127.0.0.1:5000/"
# Give up on a request after this many seconds (omit to wait forever)
# timeout_secs = 30

[plot]
# Label height in braille dots (4 = one text row)
font_size = 4.0
# Number of angle spokes around the plot
angle_guides = 8
# Radius of the intersection markers, in dots
point_radius = 1.5
# Width of the selection ray, in dots
ray_width = 2.0
guide_color = { r = 90, g = 90, b = 90 }
axis_color = { r = 220, g = 220, b = 220 }
label_color = { r = 160, g = 160, b = 160 }
# One color per wave mode
mode_colors = [
    { r = 230, g = 80, b = 80 },
    { r = 90, g = 200, b = 90 },
    { r = 100, g = 150, b = 255 },
]

[selection]
# Initial propagation direction in degrees ("12,5" is accepted)
angle = "0"
# Plane: "XY", "XZ" or "YZ"
plane = "XY"
# Variable: "velocity", "slowness" or "groupvelocity"
variable = "velocity"

[material]
# Catalog material loaded at startup (default: Si (silicio) unless
# stiffness is given below)
# name = "Cu (cobre)"
# Without a name, start from these constants instead
# density = 2336.0
# stiffness = [
#     [165.7, 63.9, 63.9, 0.0, 0.0, 0.0],
#     [63.9, 165.7, 63.9, 0.0, 0.0, 0.0],
#     [63.9, 63.9, 165.7, 0.0, 0.0, 0.0],
#     [0.0, 0.0, 0.0, 79.6, 0.0, 0.0],
#     [0.0, 0.0, 0.0, 0.0, 79.6, 0.0],
#     [0.0, 0.0, 0.0, 0.0, 0.0, 79.6],
# ]
"#
        .to_string()
    }

    /// Merge CLI arguments into config (CLI takes priority)
    pub fn merge_args(&mut self, args: &crate::Args) {
        if let Some(mode) = args.mode {
            self.display.mode = mode;
        }
        if let Some(ref path) = args.log_file {
            self.display.log_file = Some(path.clone());
        }

        if let Some(ref url) = args.url {
            self.backend.url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.backend.timeout_secs = Some(timeout);
        }

        if let Some(size) = args.font_size {
            self.plot.font_size = size;
        }
        if let Some(guides) = args.angle_guides {
            self.plot.angle_guides = guides;
        }
        if let Some(ref colors) = args.mode_colors {
            let parsed: Vec<RgbColor> = colors.split(',').filter_map(|c| RgbColor::from_hex(c.trim())).collect();
            match <[RgbColor; 3]>::try_from(parsed) {
                Ok(colors) => self.plot.mode_colors = colors,
                Err(_) => eprintln!("Warning: --mode-colors needs three hex colors, ignoring {:?}", colors),
            }
        }

        if let Some(ref angle) = args.angle {
            self.selection.angle = angle.clone();
        }
        if let Some(plane) = args.plane {
            self.selection.plane = plane;
        }
        if let Some(variable) = args.variable {
            self.selection.variable = variable;
        }

        if let Some(ref name) = args.material {
            self.material.name = Some(name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_template_matches_defaults() {
        let config: Config = toml::from_str(&Config::generate_config_template()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[backend]
url = "http://lab:8080/"

[selection]
plane = "YZ"
variable = "groupvelocity"

[material]
density = 1000.0
stiffness = [
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
]
"#,
        )
        .unwrap();
        assert_eq!(config.backend.url, "http://lab:8080/");
        assert_eq!(config.backend.timeout_secs, None);
        assert_eq!(config.selection.plane, Plane::Yz);
        assert_eq!(config.selection.variable, Variable::GroupVelocity);
        assert_eq!(config.selection.angle, "0");
        assert_eq!(config.plot.angle_guides, 8);
        assert_eq!(config.material.stiffness.map(|c| c[5][5]), Some(1.0));
        assert_eq!(config.material.startup_material(), None);
        assert_eq!(Config::default().material.startup_material(), Some(DEFAULT_MATERIAL));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = Config::default();
        let args = crate::Args::parse_from([
            "anisoplot",
            "--mode",
            "print",
            "--url",
            "http://other/",
            "--angle",
            "-30",
            "--plane",
            "xz",
            "--variable",
            "slowness",
            "--material",
            "Zn (zinc)",
            "--timeout",
            "5",
            "--mode-colors",
            "#AA0000, #005000,#0000FF",
        ]);
        config.merge_args(&args);

        assert_eq!(config.display.mode, DisplayMode::Print);
        assert_eq!(config.backend.url, "http://other/");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.selection.angle, "-30");
        assert_eq!(config.selection.plane, Plane::Xz);
        assert_eq!(config.selection.variable, Variable::Slowness);
        assert_eq!(config.material.name.as_deref(), Some("Zn (zinc)"));
        assert_eq!(config.plot.font_size, 4.0);
        assert_eq!(config.plot.mode_colors[1], RgbColor::new(0, 0x50, 0));
    }

    #[test]
    fn test_bad_mode_colors_are_ignored() {
        let mut config = Config::default();
        let args = crate::Args::parse_from(["anisoplot", "--mode-colors", "#AA0000,#005000"]);
        config.merge_args(&args);
        assert_eq!(config.plot.mode_colors, PlotConfig::default().mode_colors);
    }
}
