//! Resolve the three per-mode values and the polarization matrix at the
//! selected angle.
//!
//! Velocity and slowness are read from the first sample whose angle lies
//! within tolerance of the selection. Group velocity is not collinear with
//! the propagation direction, so its curves can fold back on themselves; for
//! it every sample's ray direction is compared against the selection and the
//! largest magnitude among the matching rays wins.

use std::f64::consts::PI;

use thiserror::Error;
use tracing::debug;

use crate::model::{Matrix3, Plane, ResponseGrid, SelectionState};

/// Base angular tolerance in radians.
pub const ANGLE_TOLERANCE: f64 = 0.01;
/// Number of tolerance levels tried, `ANGLE_TOLERANCE * j` for `j = 1..=MAX_TOLERANCE_STEPS`.
pub const MAX_TOLERANCE_STEPS: usize = 49;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("no sample within {max_tolerance:.2} rad of {angle:.4} rad")]
    NoSampleInTolerance { angle: f64, max_tolerance: f64 },
    #[error("response grid has no {what} for sample {index}")]
    Malformed { what: &'static str, index: usize },
}

/// Values at the selected angle.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Index into the grid's angle samples used for the direct lookups
    pub index: usize,
    pub r: [f64; 3],
    pub a: Matrix3,
}

/// A ray-search match: the winning magnitude and the tolerance it was found at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub magnitude: f64,
    pub tolerance: f64,
}

/// Planar direction of a 2D vector, in `(0, 2π]`, with 0 along +x.
///
/// Angles grow counter-clockwise when `y` points down (pointer offsets on
/// screen) and clockwise when `y` points up. Ray vectors are matched with the
/// same convention as the pointer.
#[inline]
pub fn ray_angle(x: f64, y: f64) -> f64 {
    PI + y.atan2(-x)
}

/// First index of `t` within tolerance of `angle`, widening the tolerance in
/// steps until something matches.
pub fn nearest_index(t: &[f64], angle: f64) -> Result<usize, SampleError> {
    (1..=MAX_TOLERANCE_STEPS)
        .find_map(|j| {
            let tolerance = ANGLE_TOLERANCE * j as f64;
            t.iter().position(|&sample| (sample - angle).abs() < tolerance)
        })
        .ok_or(SampleError::NoSampleInTolerance {
            angle,
            max_tolerance: ANGLE_TOLERANCE * MAX_TOLERANCE_STEPS as f64,
        })
}

/// Largest in-plane group velocity of `mode` whose ray points at `angle`.
pub fn ray_search(rays: &[Matrix3], mode: usize, plane: Plane, angle: f64) -> Option<RayHit> {
    let (xi, yi) = plane.projection();

    for j in 1..=MAX_TOLERANCE_STEPS {
        let tolerance = ANGLE_TOLERANCE * j as f64;
        let best = rays
            .iter()
            .map(|ray| (ray[mode][xi], ray[mode][yi]))
            .filter(|&(x, y)| (ray_angle(x, y) - angle).abs() < tolerance)
            .map(|(x, y)| x.hypot(y))
            .fold(None, |best: Option<f64>, m| Some(best.map_or(m, |b| b.max(m))));

        if let Some(magnitude) = best {
            return Some(RayHit { magnitude, tolerance });
        }
    }

    None
}

/// Sample `grid` at the current selection.
pub fn sample(selection: &SelectionState, grid: &ResponseGrid) -> Result<Sample, SampleError> {
    let index = nearest_index(&grid.t, selection.angle)?;
    let plane = selection.plane;

    let r = match grid.magnitudes(selection.variable, plane) {
        Some(values) => *values.get(index).ok_or(SampleError::Malformed {
            what: "curve value",
            index,
        })?,
        None => {
            let rays = grid.rays(plane);
            [0, 1, 2].map(|mode| match ray_search(rays, mode, plane, selection.angle) {
                Some(hit) => {
                    debug!("Mode {} ray found at tolerance {:.2}", mode, hit.tolerance);
                    hit.magnitude
                }
                None => 0.0,
            })
        }
    };

    let a = *grid
        .a
        .get(plane)
        .get(index)
        .ok_or(SampleError::Malformed {
            what: "polarization matrix",
            index,
        })?;

    Ok(Sample { index, r, a })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Curves, PlaneMap, Variable};
    use std::f64::consts::FRAC_PI_2;

    fn four_sample_grid() -> ResponseGrid {
        let t = vec![0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];
        let values = vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0], [10.0, 11.0, 12.0]];
        let a: Vec<Matrix3> = (0..4).map(|k| [[k as f64, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]).collect();
        ResponseGrid {
            t,
            velocity: Curves {
                r: PlaneMap { xy: values.clone(), xz: values.clone(), yz: values },
                max: PlaneMap { xy: 12.0, xz: 12.0, yz: 12.0 },
            },
            a: PlaneMap { xy: a.clone(), xz: a.clone(), yz: a },
            ..Default::default()
        }
    }

    #[test]
    fn test_nearest_sample_within_tolerance() {
        let grid = four_sample_grid();
        let selection = SelectionState::new(FRAC_PI_2 + 0.005, Plane::Xy, Variable::Velocity);
        let s = sample(&selection, &grid).unwrap();
        assert_eq!(s.index, 1);
        assert_eq!(s.r, [4.0, 5.0, 6.0]);
        assert_eq!(s.a[0][0], 1.0);
    }

    #[test]
    fn test_nearest_prefers_first_match() {
        let t = [0.0, 0.004, 0.008];
        assert_eq!(nearest_index(&t, 0.007), Ok(0));
    }

    #[test]
    fn test_nearest_widens_then_fails() {
        let t = [0.0, 2.0];
        assert_eq!(nearest_index(&t, 0.3), Ok(0));
        let err = nearest_index(&t, 0.6).unwrap_err();
        assert!(matches!(err, SampleError::NoSampleInTolerance { .. }));
    }

    #[test]
    fn test_ray_angle_convention() {
        // Screen offsets: y grows downward
        assert!((ray_angle(1.0, -1.0) - PI / 4.0).abs() < 1e-12);
        assert!((ray_angle(0.0, -1.0) - FRAC_PI_2).abs() < 1e-12);
        assert!((ray_angle(-1.0, 0.0) - PI).abs() < 1e-12);
        assert!((ray_angle(0.0, 1.0) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((ray_angle(1.0, 0.0) - 2.0 * PI).abs() < 1e-12);
    }

    /// Ray whose `ray_angle` is `angle`.
    fn ray_at(angle: f64, magnitude: f64) -> Matrix3 {
        let v = [magnitude * angle.cos(), -magnitude * angle.sin(), 0.0];
        [v, v, v]
    }

    #[test]
    fn test_ray_search_widens_and_keeps_maximum() {
        let target = 1.0;
        let rays = vec![
            ray_at(target + 0.042, 2.0),
            ray_at(target - 0.047, 5.0),
            ray_at(target + 0.055, 9.0),
            ray_at(target + 0.5, 20.0),
        ];

        let hit = ray_search(&rays, 0, Plane::Xy, target).unwrap();
        assert!((hit.tolerance - 0.05).abs() < 1e-12);
        assert!((hit.magnitude - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_ray_search_uses_plane_projection() {
        // Ray along -z only has an in-plane direction in XZ and YZ
        let ray = [[0.0, 0.0, -3.0]; 3];
        let hit = ray_search(&[ray], 1, Plane::Xz, FRAC_PI_2).unwrap();
        assert!((hit.magnitude - 3.0).abs() < 1e-12);
        assert!(ray_search(&[ray], 1, Plane::Yz, FRAC_PI_2).is_some());
        assert!(ray_search(&[ray], 1, Plane::Xy, FRAC_PI_2).is_none());
    }

    #[test]
    fn test_group_velocity_defaults_to_zero() {
        let mut grid = four_sample_grid();
        let rays = vec![ray_at(PI, 4.0); 4];
        grid.groupvelocity.r = PlaneMap { xy: rays.clone(), xz: rays.clone(), yz: rays };
        let selection = SelectionState::new(0.0, Plane::Xy, Variable::GroupVelocity);
        let s = sample(&selection, &grid).unwrap();
        assert_eq!(s.r, [0.0, 0.0, 0.0]);
        // Matrix still comes from the direct lookup
        assert_eq!(s.index, 0);
    }

    #[test]
    fn test_short_curve_is_reported() {
        let mut grid = four_sample_grid();
        grid.velocity.r.xy.truncate(1);
        let selection = SelectionState::new(PI, Plane::Xy, Variable::Velocity);
        assert_eq!(
            sample(&selection, &grid),
            Err(SampleError::Malformed { what: "curve value", index: 2 })
        );
    }
}
