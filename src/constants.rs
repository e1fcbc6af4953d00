//! Baseline physical constants and utility functions.
//!
//! ## Accuracy
//!
//! μ₀ is given to 12 significant figures following CODATA 2018. Displacement
//! currents are neglected, so ε₀ never enters the forward model.
//!
//! ## References
//!
//! - NIST Reference on Constants, Units, and Uncertainty: <https://physics.nist.gov/cuu/Constants/>
//! - Mohr, P. J., Newell, D. B., Taylor, B. N., & Tiesinga, E. (2019). CODATA Recommended Values of the Fundamental Physical Constants: 2018.

use std::f64::consts::PI;

use crate::math::Scalar;

/// Vacuum permeability μ₀ in henries per meter (H/m).
/// Approximate value: 1.25663706212 × 10⁻⁶ H/m (12 significant figures).
pub const VACUUM_PERMEABILITY: Scalar = 1.256_637_062_12e-6;

/// Returns the angular frequency corresponding to a linear frequency `hz`.
#[inline]
#[must_use]
pub fn angular_frequency(hz: Scalar) -> Scalar {
    2.0 * PI * hz
}

/// Plane-wave skin depth δ = √(2 / (ω μ σ)) in meters.
///
/// Returns `Scalar::INFINITY` for a non-conducting medium.
#[inline]
#[must_use]
pub fn skin_depth(hz: Scalar, conductivity: Scalar, permeability: Scalar) -> Scalar {
    let denom = angular_frequency(hz) * permeability * conductivity;
    if denom <= 0.0 {
        Scalar::INFINITY
    } else {
        (2.0 / denom).sqrt()
    }
}
