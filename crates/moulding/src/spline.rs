//! Catmull-Rom interpolation for radial profiles.
//!
//! Catmull-Rom passes through every control point and is C1 continuous,
//! which suits hand-edited profiles with few control points.

use std::f32::consts::TAU;

/// Evaluate one Catmull-Rom segment between `p1` and `p2` at `t` in [0, 1].
/// `p0` and `p3` only shape the tangents.
pub fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;

    a * t3 + b * t2 + c * t + p1
}

/// Sample an open spline through `values` at `t` in [0, 1].
/// Endpoint tangents repeat the first/last control point.
pub fn sample_open(values: &[f32], t: f32) -> f32 {
    match values {
        [] => 0.0,
        [only] => *only,
        [first, last] => first * (1.0 - t) + last * t,
        _ => {
            let t = t.clamp(0.0, 1.0);
            let segments = values.len() - 1;
            let scaled = t * segments as f32;
            let index = (scaled.floor() as usize).min(segments - 1);
            let local_t = scaled - index as f32;

            let p0 = if index == 0 { values[0] } else { values[index - 1] };
            let p1 = values[index];
            let p2 = values[index + 1];
            let p3 = if index + 2 >= values.len() {
                values[values.len() - 1]
            } else {
                values[index + 2]
            };

            catmull_rom(p0, p1, p2, p3, local_t)
        }
    }
}

/// Sample a closed spline around a ring of `values` at `angle` radians.
/// Control points sit evenly on [0, 2pi); the spline wraps.
pub fn sample_closed(values: &[f32], angle: f32) -> f32 {
    match values {
        [] => 0.0,
        [only] => *only,
        _ => {
            let n = values.len();
            let normalized = angle.rem_euclid(TAU);
            let scaled = (normalized / TAU) * n as f32;
            let index = (scaled.floor() as usize) % n;
            let local_t = scaled - scaled.floor();

            let p0 = values[(index + n - 1) % n];
            let p1 = values[index];
            let p2 = values[(index + 1) % n];
            let p3 = values[(index + 2) % n];

            catmull_rom(p0, p1, p2, p3, local_t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_hits_endpoints() {
        assert!((catmull_rom(0.0, 1.0, 2.0, 3.0, 0.0) - 1.0).abs() < 1e-6);
        assert!((catmull_rom(0.0, 1.0, 2.0, 3.0, 1.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_open_spline_endpoints() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((sample_open(&values, 0.0) - 1.0).abs() < 1e-6);
        assert!((sample_open(&values, 1.0) - 4.0).abs() < 1e-6);
        let mid = sample_open(&values, 0.5);
        assert!(mid > 2.0 && mid < 3.0);
    }

    #[test]
    fn test_open_spline_two_points_is_linear() {
        let values = [1.0, 3.0];
        assert!((sample_open(&values, 0.25) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_closed_spline_wraps() {
        let values = [1.0, 2.0, 3.0, 2.0];
        let start = sample_closed(&values, 0.0);
        let full = sample_closed(&values, TAU);
        assert!((start - full).abs() < 1e-5);
    }

    #[test]
    fn test_closed_spline_negative_angle() {
        let values = [1.0, 2.0, 3.0, 2.0];
        let a = sample_closed(&values, -0.5);
        let b = sample_closed(&values, TAU - 0.5);
        assert!((a - b).abs() < 1e-5);
    }
}
