//! Shared numerical primitives anchored on `nalgebra`.

use nalgebra::Vector3;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Convenient alias for three-dimensional real vectors.
pub type R3 = Vector3<Scalar>;
/// Primary complex scalar type used for phasors.
pub type CScalar = num_complex::Complex<Scalar>;
/// Convenient alias for three-dimensional complex vectors.
pub type C3 = Vector3<CScalar>;

/// Imaginary unit.
pub const J: CScalar = CScalar::new(0.0, 1.0);

/// Complete elliptic integrals of the first and second kind, `(K(m), E(m))`,
/// for parameter `m = k²` in `[0, 1)`, via the arithmetic-geometric mean.
#[must_use]
pub fn elliptic_ke(m: Scalar) -> (Scalar, Scalar) {
    let mut a = 1.0;
    let mut b = (1.0 - m).sqrt();
    let mut c = m.sqrt();
    let mut pow2 = 0.5;
    let mut sum = pow2 * c * c;
    for _ in 0..64 {
        if c.abs() <= Scalar::EPSILON * a {
            break;
        }
        let an = 0.5 * (a + b);
        let bn = (a * b).sqrt();
        c = 0.5 * (a - b);
        a = an;
        b = bn;
        pow2 *= 2.0;
        sum += pow2 * c * c;
    }
    let k = std::f64::consts::FRAC_PI_2 / a;
    (k, k * (1.0 - sum))
}

/// Legendre polynomial `P_n(x)` and its derivative.
fn legendre(n: usize, x: Scalar) -> (Scalar, Scalar) {
    let (mut prev, mut cur) = (1.0, x);
    for k in 2..=n {
        let k = k as Scalar;
        let next = ((2.0 * k - 1.0) * x * cur - (k - 1.0) * prev) / k;
        prev = cur;
        cur = next;
    }
    (cur, n as Scalar * (x * cur - prev) / (x * x - 1.0))
}

/// Gauss-Legendre nodes and weights on `[-1, 1]`, nodes ascending.
#[must_use]
pub fn gauss_legendre(n: usize) -> Vec<(Scalar, Scalar)> {
    (0..n)
        .map(|i| {
            let mut x = -(std::f64::consts::PI * (i as Scalar + 0.75) / (n as Scalar + 0.5)).cos();
            for _ in 0..100 {
                let (p, dp) = legendre(n, x);
                let step = p / dp;
                x -= step;
                if step.abs() < 1.0e-15 {
                    break;
                }
            }
            let (_, dp) = legendre(n, x);
            (x, 2.0 / ((1.0 - x * x) * dp * dp))
        })
        .collect()
}

/// Relative L2 misfit `‖a − b‖ / ‖b‖` between two real sequences.
///
/// Returns `Scalar::INFINITY` when the reference has zero norm but the
/// sequences differ.
#[must_use]
pub fn relative_l2_error(values: &[Scalar], reference: &[Scalar]) -> Scalar {
    let num: Scalar = values
        .iter()
        .zip(reference)
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    let den: Scalar = reference.iter().map(|b| b * b).sum();
    if den == 0.0 {
        if num == 0.0 { 0.0 } else { Scalar::INFINITY }
    } else {
        (num / den).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn elliptic_integrals_at_zero_parameter() {
        let (k, e) = elliptic_ke(0.0);
        assert_relative_eq!(k, FRAC_PI_2, epsilon = 1.0e-15);
        assert_relative_eq!(e, FRAC_PI_2, epsilon = 1.0e-15);
    }

    #[test]
    fn elliptic_integrals_match_tabulated_values() {
        // Abramowitz & Stegun table 17.1, m = 0.5
        let (k, e) = elliptic_ke(0.5);
        assert_relative_eq!(k, 1.854_074_677_301_372, max_relative = 1.0e-13);
        assert_relative_eq!(e, 1.350_643_881_047_675, max_relative = 1.0e-13);
    }

    #[test]
    fn gauss_legendre_three_point_rule() {
        let rule = gauss_legendre(3);
        assert_relative_eq!(rule[0].0, -(0.6_f64).sqrt(), epsilon = 1.0e-14);
        assert_relative_eq!(rule[1].0, 0.0, epsilon = 1.0e-14);
        assert_relative_eq!(rule[1].1, 8.0 / 9.0, epsilon = 1.0e-14);
        assert_relative_eq!(rule[2].1, 5.0 / 9.0, epsilon = 1.0e-14);
    }

    #[test]
    fn gauss_legendre_integrates_polynomials_exactly() {
        for n in 1..=8 {
            let rule = gauss_legendre(n);
            let total: Scalar = rule.iter().map(|(_, w)| w).sum();
            assert_relative_eq!(total, 2.0, epsilon = 1.0e-13);
            let degree = 2 * n as i32 - 2;
            let integral: Scalar = rule.iter().map(|(x, w)| w * x.powi(degree)).sum();
            assert_relative_eq!(integral, 2.0 / (degree as Scalar + 1.0), epsilon = 1.0e-13);
        }
    }

    #[test]
    fn relative_error_of_identical_sequences_is_zero() {
        let v = [1.0, -2.0, 3.0];
        assert_eq!(relative_l2_error(&v, &v), 0.0);
        assert_relative_eq!(relative_l2_error(&[1.0, 0.0], &[2.0, 0.0]), 0.5);
    }
}
