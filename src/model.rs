use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 3×3 matrix as sent by the backend (row-major).
pub type Matrix3 = [[f64; 3]; 3];

/// Coordinate plane the 3D response is projected onto.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, ValueEnum, PartialEq, Eq, Hash)]
pub enum Plane {
    #[default]
    #[serde(rename = "XY")]
    #[value(name = "xy")]
    Xy,
    #[serde(rename = "XZ")]
    #[value(name = "xz")]
    Xz,
    #[serde(rename = "YZ")]
    #[value(name = "yz")]
    Yz,
}

impl Plane {
    pub fn all() -> &'static [Plane] {
        &[Plane::Xy, Plane::Xz, Plane::Yz]
    }

    /// Indices of the 3D components drawn as the plot's horizontal and vertical axes.
    pub fn projection(&self) -> (usize, usize) {
        match self {
            Plane::Xz => (0, 2),
            Plane::Yz => (1, 2),
            Plane::Xy => (0, 1),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Plane::Xy => "XY",
            Plane::Xz => "XZ",
            Plane::Yz => "YZ",
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Dependent variable shown in the polar plot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    #[default]
    Velocity,
    Slowness,
    #[value(name = "groupvelocity")]
    GroupVelocity,
}

impl Variable {
    pub fn all() -> &'static [Variable] {
        &[Variable::Velocity, Variable::Slowness, Variable::GroupVelocity]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Variable::Velocity => "velocity",
            Variable::Slowness => "slowness",
            Variable::GroupVelocity => "groupvelocity",
        }
    }

    /// Caption shown next to the numeric outputs
    pub fn label(&self) -> &'static str {
        match self {
            Variable::Velocity => "Phase velocity (m/s)",
            Variable::Slowness => "Slowness",
            Variable::GroupVelocity => "Group velocity",
        }
    }

    /// Decimal digits used when displaying a sampled value.
    pub fn digits(&self) -> usize {
        match self {
            Variable::Velocity => 0,
            Variable::Slowness | Variable::GroupVelocity => 3,
        }
    }

    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.digits(), value)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What the polar plot currently shows. Single source of truth for the
/// angle field and the radio groups.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    /// Selected direction in radians, within `[0, 2π)`
    pub angle: f64,
    pub plane: Plane,
    pub variable: Variable,
    /// Last sampled magnitude per wave mode
    pub r: [f64; 3],
    /// Last sampled polarization matrix
    pub a: Matrix3,
}

impl SelectionState {
    pub fn new(angle: f64, plane: Plane, variable: Variable) -> Self {
        Self {
            angle,
            plane,
            variable,
            r: [0.0; 3],
            a: [[0.0; 3]; 3],
        }
    }

    /// Selected values formatted with the variable's display precision.
    pub fn formatted_values(&self) -> [String; 3] {
        self.r.map(|v| self.variable.format_value(v))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    pub is_rotating: bool,
}

/// One value per coordinate plane, keyed the way the backend keys them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlaneMap<T> {
    #[serde(rename = "XY")]
    pub xy: T,
    #[serde(rename = "XZ")]
    pub xz: T,
    #[serde(rename = "YZ")]
    pub yz: T,
}

impl<T> PlaneMap<T> {
    pub fn get(&self, plane: Plane) -> &T {
        match plane {
            Plane::Xy => &self.xy,
            Plane::Xz => &self.xz,
            Plane::Yz => &self.yz,
        }
    }
}

/// Sampled curves of one dependent variable.
///
/// `r[plane][k]` is the value at angle `t[k]`; `max[plane]` bounds the plot scale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Curves<V> {
    pub r: PlaneMap<Vec<V>>,
    pub max: PlaneMap<f64>,
}

/// Angular sampling of the wave response fetched from the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseGrid {
    /// Sample angles in radians, ascending over one revolution
    pub t: Vec<f64>,
    /// Phase velocity magnitude per mode
    pub velocity: Curves<[f64; 3]>,
    /// Slowness magnitude per mode
    pub slowness: Curves<[f64; 3]>,
    /// Group velocity ray per mode, `[mode][coordinate]`
    pub groupvelocity: Curves<Matrix3>,
    /// Polarization matrix per sample
    #[serde(rename = "A")]
    pub a: PlaneMap<Vec<Matrix3>>,
}

impl ResponseGrid {
    pub fn max(&self, variable: Variable, plane: Plane) -> f64 {
        *match variable {
            Variable::Velocity => self.velocity.max.get(plane),
            Variable::Slowness => self.slowness.max.get(plane),
            Variable::GroupVelocity => self.groupvelocity.max.get(plane),
        }
    }

    /// Scalar magnitudes for velocity or slowness; `None` for group velocity.
    pub fn magnitudes(&self, variable: Variable, plane: Plane) -> Option<&[[f64; 3]]> {
        match variable {
            Variable::Velocity => Some(self.velocity.r.get(plane)),
            Variable::Slowness => Some(self.slowness.r.get(plane)),
            Variable::GroupVelocity => None,
        }
    }

    pub fn rays(&self, plane: Plane) -> &[Matrix3] {
        self.groupvelocity.r.get(plane)
    }
}
