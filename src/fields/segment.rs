use std::f64::consts::PI;

use crate::math::{Scalar, R3};

/// Biot-Savart field of a straight wire from `start` to `end` carrying `current`.
///
/// With `a` and `b` the endpoint vectors relative to the field point,
/// `H = I/(4π) · (a × b)(|a| + |b|) / (|a||b|(|a||b| + a·b))`.
/// Points on the wire itself yield a non-finite value.
#[must_use]
pub fn segment_field(start: &R3, end: &R3, current: Scalar, point: &R3) -> R3 {
    let a = start - point;
    let b = end - point;
    let (na, nb) = (a.norm(), b.norm());
    let scale = current / (4.0 * PI) * (na + nb) / (na * nb * (na * nb + a.dot(&b)));
    a.cross(&b) * scale
}

/// Field of a closed polygon carrying `current` around `vertices`.
#[must_use]
pub fn polygon_field(vertices: &[R3], current: Scalar, point: &R3) -> R3 {
    let n = vertices.len();
    (0..n)
        .map(|i| segment_field(&vertices[i], &vertices[(i + 1) % n], current, point))
        .sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::fields::dipole_field;

    #[test]
    fn long_wire_limit() {
        let h = segment_field(&R3::new(-1.0e6, 0.0, 0.0), &R3::new(1.0e6, 0.0, 0.0), 2.0, &R3::new(0.0, 0.0, 0.5));
        assert_relative_eq!(h.y, -2.0 / (2.0 * PI * 0.5), max_relative = 1.0e-9);
    }

    #[test]
    fn matches_biot_savart_sum() {
        let h = segment_field(&R3::zeros(), &R3::new(1.0, 2.0, 0.0), 1.0, &R3::new(0.3, -1.0, 2.0));
        assert_relative_eq!(h.x, 0.015_106_640_495_755, max_relative = 1.0e-9);
        assert_relative_eq!(h.y, -0.007_553_320_247_878, max_relative = 1.0e-9);
        assert_relative_eq!(h.z, -0.006_042_656_198_302, max_relative = 1.0e-9);
    }

    #[test]
    fn collinear_point_off_the_wire_sees_no_field() {
        let h = segment_field(&R3::zeros(), &R3::x(), 1.0, &R3::new(3.0, 0.0, 0.0));
        assert_eq!(h, R3::zeros());
    }

    #[test]
    fn small_square_looks_like_a_dipole() {
        let s = 1.0e-2;
        let square = [
            R3::new(-s, -s, 0.0),
            R3::new(s, -s, 0.0),
            R3::new(s, s, 0.0),
            R3::new(-s, s, 0.0),
        ];
        let point = R3::new(2.0, -1.0, 1.5);
        let dipole = dipole_field(&R3::zeros(), &R3::new(0.0, 0.0, 4.0 * s * s), &point);
        // Finite size enters at (s/R)²; compare whole vectors so small components don't dominate.
        let err = (polygon_field(&square, 1.0, &point) - dipole).norm() / dipole.norm();
        assert!(err < 1.0e-4, "relative error {err:.3e}");
    }
}
