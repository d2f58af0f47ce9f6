//! Signed distance functions for the mould primitives.
//!
//! All functions evaluate in the parent joint's local frame; the mould
//! manager maps world points into that frame before calling in.

use crate::spline;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Step used for central-difference gradients.
pub const GRADIENT_EPSILON: f32 = 0.001;

/// How a profiled capsule interpolates between profile control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProfileInterpolation {
    /// Bilinear: linear between rows, circular-linear around rings.
    /// Preserves sharp detail.
    #[default]
    Linear,
    /// Catmull-Rom along both axes. Smooth, suits hand-edited profiles.
    Spline,
}

/// Sphere surface distance: `|p - center| - radius`.
pub fn sphere_sdf(point: Vec3, center: Vec3, radius: f32) -> f32 {
    (point - center).length() - radius
}

/// Capsule surface distance: project onto the segment `[a, b]`, clamp, and
/// measure from the closest point.
pub fn capsule_sdf(point: Vec3, a: Vec3, b: Vec3, radius: f32) -> f32 {
    let ba = b - a;
    let pa = point - a;
    let ba_len_sq = ba.length_squared();

    if ba_len_sq < 1e-8 {
        // Degenerate segment, treat as sphere
        return pa.length() - radius;
    }

    let h = (pa.dot(ba) / ba_len_sq).clamp(0.0, 1.0);
    (pa - ba * h).length() - radius
}

/// Polynomial smooth minimum blending two distances over width `k`.
/// `k` near zero degenerates to a hard min.
pub fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
    if k <= 1e-6 {
        return a.min(b);
    }
    let h = (k - (a - b).abs()).max(0.0);
    a.min(b) - h * h * 0.25 / k
}

/// Distance to a capsule whose cross-section radius varies along the axis
/// and around it.
///
/// `profiles` is indexed `[segment_along_axis][control_point_around_ring]`;
/// rows sit evenly on the axis, control points evenly on [0, 2pi) starting
/// at the frame's reference direction. The effective radius at the point's
/// axial parameter and angle is interpolated from the bracketing rows and
/// control points; distance is measured radially from the axis.
pub fn profiled_capsule_sdf(
    point: Vec3,
    a: Vec3,
    b: Vec3,
    profiles: &[Vec<f32>],
    interpolation: ProfileInterpolation,
) -> f32 {
    let ba = b - a;
    let pa = point - a;
    let ba_len_sq = ba.length_squared();

    if ba_len_sq < 1e-8 {
        let radius = profiles
            .first()
            .map(|ring| ring_mean(ring))
            .unwrap_or(0.1);
        return pa.length() - radius;
    }

    let t_unclamped = pa.dot(ba) / ba_len_sq;

    // Spherical end caps beyond the segment, sized from the end rows
    if t_unclamped < 0.0 {
        let cap = profiles.first().map(|ring| ring_mean(ring)).unwrap_or(0.1);
        return pa.length() - cap;
    }
    if t_unclamped > 1.0 {
        let cap = profiles.last().map(|ring| ring_mean(ring)).unwrap_or(0.1);
        return (point - b).length() - cap;
    }
    let t = t_unclamped;

    // Orthonormal frame around the axis. The reference direction must not
    // depend on the query point, or angle zero would drift around the bone.
    let axis = ba / ba_len_sq.sqrt();
    let reference = if axis.y.abs() > 0.9 { Vec3::Z } else { Vec3::Y };
    let right = axis.cross(reference).normalize();
    let forward = right.cross(axis).normalize();

    let on_axis = a + ba * t;
    let to_point = point - on_axis;
    let radial = to_point - axis * to_point.dot(axis);
    let radial_dist = radial.length();

    let angle = if radial_dist < 1e-6 {
        0.0
    } else {
        let unit = radial / radial_dist;
        unit.dot(forward).atan2(unit.dot(right))
    };

    radial_dist - sample_profile(profiles, t, angle, interpolation)
}

/// Interpolate the effective radius of a profile table at `(t, angle)`.
pub fn sample_profile(
    profiles: &[Vec<f32>],
    t: f32,
    angle: f32,
    interpolation: ProfileInterpolation,
) -> f32 {
    if profiles.is_empty() {
        return 0.1;
    }
    let angle = angle.rem_euclid(TAU);

    match interpolation {
        ProfileInterpolation::Spline => {
            let along: Vec<f32> = profiles
                .iter()
                .map(|ring| sample_ring(ring, angle, ProfileInterpolation::Spline))
                .collect();
            spline::sample_open(&along, t)
        }
        ProfileInterpolation::Linear => {
            let last = profiles.len() - 1;
            let scaled = t * last as f32;
            let row0 = scaled.floor() as usize;
            let row1 = (row0 + 1).min(last);
            let frac = scaled - row0 as f32;

            let r0 = sample_ring(&profiles[row0], angle, ProfileInterpolation::Linear);
            let r1 = sample_ring(&profiles[row1], angle, ProfileInterpolation::Linear);
            r0 * (1.0 - frac) + r1 * frac
        }
    }
}

/// Interpolate one ring of control points at `angle`, wrapping at 2pi.
pub fn sample_ring(ring: &[f32], angle: f32, interpolation: ProfileInterpolation) -> f32 {
    match ring {
        [] => 0.1,
        [only] => *only,
        _ => match interpolation {
            ProfileInterpolation::Spline => spline::sample_closed(ring, angle),
            ProfileInterpolation::Linear => {
                let n = ring.len();
                let step = TAU / n as f32;
                let scaled = (angle / step).rem_euclid(n as f32);
                let i0 = scaled.floor() as usize % n;
                let i1 = (i0 + 1) % n;
                let frac = scaled.fract();
                ring[i0] * (1.0 - frac) + ring[i1] * frac
            }
        },
    }
}

fn ring_mean(ring: &[f32]) -> f32 {
    if ring.is_empty() {
        return 0.1;
    }
    ring.iter().sum::<f32>() / ring.len() as f32
}

/// Central-difference gradient of a field at `point`.
pub fn gradient(point: Vec3, field: impl Fn(Vec3) -> f32) -> Vec3 {
    let e = GRADIENT_EPSILON;
    Vec3::new(
        field(point + Vec3::new(e, 0.0, 0.0)) - field(point - Vec3::new(e, 0.0, 0.0)),
        field(point + Vec3::new(0.0, e, 0.0)) - field(point - Vec3::new(0.0, e, 0.0)),
        field(point + Vec3::new(0.0, 0.0, e)) - field(point - Vec3::new(0.0, 0.0, e)),
    ) / (2.0 * e)
}
