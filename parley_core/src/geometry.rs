//! Interpolation primitives for message arcs.
//!
//! Everything here is pure math over `nalgebra::Vector3<f64>`: scalar and
//! vector linear interpolation, plus cubic Bezier evaluation via the
//! De Casteljau construction. The transit animator builds an [`ArcPath`]
//! between two ring positions and samples it with a normalized progress
//! value.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Scalar linear interpolation. `t` is not clamped.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Component-wise linear interpolation between two points.
pub fn lerp_vec(a: &Vector3<f64>, b: &Vector3<f64>, t: f64) -> Vector3<f64> {
    Vector3::new(
        lerp(a.x, b.x, t),
        lerp(a.y, b.y, t),
        lerp(a.z, b.z, t),
    )
}

/// Evaluates a cubic Bezier curve at parameter `t` via De Casteljau:
/// three levels of nested linear interpolation over the four control
/// points. Numerically tame for `t` slightly outside `[0, 1]`.
pub fn cubic_bezier(
    p0: &Vector3<f64>,
    p1: &Vector3<f64>,
    p2: &Vector3<f64>,
    p3: &Vector3<f64>,
    t: f64,
) -> Vector3<f64> {
    let a = lerp_vec(p0, p1, t);
    let b = lerp_vec(p1, p2, t);
    let c = lerp_vec(p2, p3, t);

    let d = lerp_vec(&a, &b, t);
    let e = lerp_vec(&b, &c, t);

    lerp_vec(&d, &e, t)
}

/// A curved path between two ring positions.
///
/// The interior control points sit on the straight line between the
/// endpoints at 1/3 and 2/3, lifted to `arc_height` above the ground
/// plane, so every message orb rises and falls along the same kind of
/// arch regardless of how far apart the speakers sit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcPath {
    /// Start of the arc (sender position).
    pub p0: Vector3<f64>,

    /// First lifted control point.
    pub p1: Vector3<f64>,

    /// Second lifted control point.
    pub p2: Vector3<f64>,

    /// End of the arc (recipient position).
    pub p3: Vector3<f64>,
}

impl ArcPath {
    /// Builds the arc between `from` and `to` with the given apex height.
    pub fn between(from: &Vector3<f64>, to: &Vector3<f64>, arc_height: f64) -> Self {
        let mut p1 = lerp_vec(from, to, 1.0 / 3.0);
        let mut p2 = lerp_vec(from, to, 2.0 / 3.0);
        p1.y = arc_height;
        p2.y = arc_height;

        Self {
            p0: *from,
            p1,
            p2,
            p3: *to,
        }
    }

    /// Samples the arc at normalized progress `t` in `[0, 1]`.
    pub fn position_at(&self, t: f64) -> Vector3<f64> {
        cubic_bezier(&self.p0, &self.p1, &self.p2, &self.p3, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp_endpoints() {
        assert_relative_eq!(lerp(2.0, 10.0, 0.0), 2.0);
        assert_relative_eq!(lerp(2.0, 10.0, 1.0), 10.0);
        assert_relative_eq!(lerp(2.0, 10.0, 0.5), 6.0);
    }

    #[test]
    fn test_lerp_vec_midpoint() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(4.0, -2.0, 8.0);
        let mid = lerp_vec(&a, &b, 0.5);
        assert_relative_eq!(mid.x, 2.0);
        assert_relative_eq!(mid.y, -1.0);
        assert_relative_eq!(mid.z, 4.0);
    }

    #[test]
    fn test_bezier_hits_endpoints() {
        let p0 = Vector3::new(6.0, 0.0, 0.0);
        let p1 = Vector3::new(4.0, 2.5, 0.0);
        let p2 = Vector3::new(-4.0, 2.5, 0.0);
        let p3 = Vector3::new(-6.0, 0.0, 0.0);

        let start = cubic_bezier(&p0, &p1, &p2, &p3, 0.0);
        let end = cubic_bezier(&p0, &p1, &p2, &p3, 1.0);

        assert_relative_eq!(start, p0);
        assert_relative_eq!(end, p3);
    }

    #[test]
    fn test_bezier_matches_polynomial_form() {
        // De Casteljau must agree with the Bernstein polynomial expansion.
        let p0 = Vector3::new(1.0, 0.0, -3.0);
        let p1 = Vector3::new(2.0, 2.0, 0.0);
        let p2 = Vector3::new(-1.0, 2.0, 4.0);
        let p3 = Vector3::new(0.0, 0.0, 5.0);

        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let u = 1.0 - t;
            let expected = p0 * u * u * u
                + p1 * 3.0 * u * u * t
                + p2 * 3.0 * u * t * t
                + p3 * t * t * t;
            let got = cubic_bezier(&p0, &p1, &p2, &p3, t);
            assert_relative_eq!(got, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_arc_path_control_points_lifted() {
        let from = Vector3::new(6.0, 0.0, 0.0);
        let to = Vector3::new(-6.0, 0.0, 0.0);
        let arc = ArcPath::between(&from, &to, 2.0);

        assert_relative_eq!(arc.p1.x, 2.0);
        assert_relative_eq!(arc.p1.y, 2.0);
        assert_relative_eq!(arc.p2.x, -2.0);
        assert_relative_eq!(arc.p2.y, 2.0);
        assert_relative_eq!(arc.position_at(0.0), from);
        assert_relative_eq!(arc.position_at(1.0), to);
    }

    #[test]
    fn test_arc_path_apex_above_ground() {
        let from = Vector3::new(6.0, 0.0, 0.0);
        let to = Vector3::new(0.0, 0.0, 6.0);
        let arc = ArcPath::between(&from, &to, 2.5);

        let apex = arc.position_at(0.5);
        assert!(apex.y > 0.0);
        assert!(apex.y <= 2.5);
    }
}
