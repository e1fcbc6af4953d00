//! Closed-form references shared by the validation tests.

#![allow(dead_code)]

use std::f64::consts::PI;

use layered_em::prelude::*;

/// 61 frequencies from 0.1 Hz to 100 kHz.
pub fn validation_frequencies() -> Vec<Scalar> {
    logspace_hz(1.0e-1, 1.0e5, 61).unwrap()
}

fn wavenumber(hz: Scalar, sigma: CScalar) -> CScalar {
    const J: CScalar = CScalar::new(0.0, 1.0);
    (-J * angular_frequency(hz) * VACUUM_PERMEABILITY * sigma).sqrt()
}

/// Total Hz of a unit vertical dipole on a half-space, receiver on the surface at offset `r`.
pub fn half_space_vmd_total(hz: Scalar, r: Scalar, sigma: CScalar) -> CScalar {
    const J: CScalar = CScalar::new(0.0, 1.0);
    let k = wavenumber(hz, sigma);
    let ikr = J * k * r;
    let poly = 9.0 + 9.0 * ikr - 4.0 * k * k * r * r - J * k * k * k * r * r * r;
    (9.0 - poly * (-ikr).exp()) / (2.0 * PI * k * k * r.powi(5))
}

/// Total Hz at the centre of a unit-current loop of radius `a` on a half-space.
pub fn half_space_loop_total(hz: Scalar, a: Scalar, sigma: CScalar) -> CScalar {
    const J: CScalar = CScalar::new(0.0, 1.0);
    let k = wavenumber(hz, sigma);
    let ika = J * k * a;
    let poly = 3.0 + 3.0 * ika - k * k * a * a;
    -(3.0 - poly * (-ika).exp()) / (k * k * a.powi(3))
}

/// Flattens complex values into `[re, im, re, im, ...]`.
pub fn interleave(values: &[CScalar]) -> Vec<Scalar> {
    values.iter().flat_map(|v| [v.re, v.im]).collect()
}

/// Runs a one-receiver frequency sweep and returns the `Both` data.
pub fn sweep(
    geometry: &SourceGeometry,
    receiver: Receiver,
    thicknesses: Vec<Scalar>,
    model: &[Scalar],
    dispersion: Option<Vec<ColeCole>>,
) -> Vec<Scalar> {
    let _ = env_logger::builder().is_test(true).try_init();
    let survey = Survey::frequency_sweep(geometry, &validation_frequencies(), &[receiver]).unwrap();
    let mut simulation =
        Simulation1DLayered::new(survey, thicknesses, IdentityMap, SimulationConfig::new("validation")).unwrap();
    if let Some(dispersion) = dispersion {
        simulation = simulation.with_dispersion(dispersion).unwrap();
    }
    simulation.predict(model).unwrap()
}
