//! Free-space magnetic fields of a point dipole and a circular ring.
//!
//! These are the primary fields added back when a receiver asks for the
//! total field, or used to normalise ppm data. Fields are H in A/m.

use std::f64::consts::PI;

use crate::math::{elliptic_ke, Scalar, R3};

/// Field of a point magnetic dipole with moment vector `moment` (A·m²) at `source`.
///
/// `H = (3(m·R̂)R̂ − m) / (4π R³)`.
#[must_use]
pub fn dipole_field(source: &R3, moment: &R3, point: &R3) -> R3 {
    let r_vec = point - source;
    let r = r_vec.norm();
    let r_hat = r_vec / r;
    (3.0 * moment.dot(&r_hat) * r_hat - moment) / (4.0 * PI * r * r * r)
}

/// Field of a horizontal ring of radius `radius` centred at `centre`
/// carrying `current` counter-clockwise seen from above.
///
/// Exact off-axis expression in complete elliptic integrals of parameter
/// `k² = 1 − α²/β²`, with `α² = a² + ρ² + z² − 2aρ` and
/// `β² = a² + ρ² + z² + 2aρ`.
#[must_use]
pub fn ring_field(centre: &R3, radius: Scalar, current: Scalar, point: &R3) -> R3 {
    let d = point - centre;
    let rho = d.x.hypot(d.y);
    let a2 = radius * radius;
    let r2 = a2 + rho * rho + d.z * d.z;
    let alpha2 = r2 - 2.0 * radius * rho;
    let beta2 = r2 + 2.0 * radius * rho;
    let beta = beta2.sqrt();
    let (k, e) = elliptic_ke(1.0 - alpha2 / beta2);
    let c = current / PI;

    let hz = c / (2.0 * alpha2 * beta) * ((a2 - rho * rho - d.z * d.z) * e + alpha2 * k);
    if rho <= 1.0e-12 * radius {
        return R3::new(0.0, 0.0, hz);
    }
    let h_rho = c * d.z / (2.0 * alpha2 * beta * rho) * (r2 * e - alpha2 * k);
    R3::new(h_rho * d.x / rho, h_rho * d.y / rho, hz)
}
