//! Horizontally layered earth and its TE reflection response.
//!
//! Layer 0 touches the surface, the last layer is the basement half-space and
//! the air above is implicit (σ = 0, μ = μ₀). Heights are measured upward
//! from the surface elevation (`topography`).

use crate::constants::{angular_frequency, skin_depth, VACUUM_PERMEABILITY};
use crate::errors::ConfigurationError;
use crate::materials::{DispersiveMaterial, LayerMaterial};
use crate::math::{CScalar, Scalar, J};

/// Immutable description of a layered earth.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStack {
    thicknesses: Vec<Scalar>,
    layers: Vec<LayerMaterial>,
    topography: Scalar,
}

impl LayerStack {
    /// Builds a stack from `n − 1` thicknesses and `n` layer materials.
    pub fn new(thicknesses: Vec<Scalar>, layers: Vec<LayerMaterial>) -> Result<Self, ConfigurationError> {
        if layers.is_empty() {
            return Err(ConfigurationError::EmptyLayerStack);
        }
        if thicknesses.len() != layers.len() - 1 {
            return Err(ConfigurationError::LengthMismatch {
                what: "thicknesses",
                expected: layers.len() - 1,
                found: thicknesses.len(),
            });
        }
        for (index, &value) in thicknesses.iter().enumerate() {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigurationError::NonPositiveThickness { index, value });
            }
        }
        for (index, layer) in layers.iter().enumerate() {
            layer.validate(index)?;
        }
        Ok(Self { thicknesses, layers, topography: 0.0 })
    }

    /// Non-dispersive, non-magnetic stack from conductivities alone.
    pub fn from_conductivities(thicknesses: Vec<Scalar>, conductivity: &[Scalar]) -> Result<Self, ConfigurationError> {
        Self::new(thicknesses, conductivity.iter().map(|&s| LayerMaterial::conductive(s)).collect())
    }

    /// Homogeneous half-space.
    pub fn half_space(conductivity: Scalar) -> Result<Self, ConfigurationError> {
        Self::from_conductivities(Vec::new(), &[conductivity])
    }

    /// Moves the surface to elevation `topography` (m).
    pub fn with_topography(mut self, topography: Scalar) -> Result<Self, ConfigurationError> {
        if !topography.is_finite() {
            return Err(ConfigurationError::InvalidSetting(format!("topography {topography} is not finite")));
        }
        self.topography = topography;
        Ok(self)
    }

    /// Number of earth layers including the basement.
    #[must_use]
    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    /// Thicknesses of the finite layers.
    #[must_use]
    pub fn thicknesses(&self) -> &[Scalar] {
        &self.thicknesses
    }

    /// Layer materials, top to bottom.
    #[must_use]
    pub fn layers(&self) -> &[LayerMaterial] {
        &self.layers
    }

    /// Elevation of the earth surface.
    #[must_use]
    pub fn topography(&self) -> Scalar {
        self.topography
    }

    /// Height above the surface of a point at `elevation`.
    #[must_use]
    pub fn height_of(&self, elevation: Scalar) -> Scalar {
        elevation - self.topography
    }

    /// Freezes the stack at one frequency, applying each layer's dispersion.
    pub fn at_frequency(&self, hz: Scalar) -> Result<FrequencyResponse<'_>, ConfigurationError> {
        if !(hz > 0.0 && hz.is_finite()) {
            return Err(ConfigurationError::NonPositiveFrequency(hz));
        }
        let omega = angular_frequency(hz);
        let (iwmusigma, min_skin_depth) = self.layers.iter().fold(
            (Vec::with_capacity(self.layers.len()), Scalar::INFINITY),
            |(mut k2, delta), layer| {
                let sigma = layer.complex_conductivity(hz);
                k2.push(J * omega * layer.permeability * sigma);
                let d = skin_depth(hz, sigma.norm(), layer.permeability);
                (k2, delta.min(d))
            },
        );
        Ok(FrequencyResponse {
            stack: self,
            hz,
            iwmusigma,
            min_skin_depth,
        })
    }

    /// TE reflection coefficient seen from the air for radial wavenumber
    /// `wavenumber` at `hz`.
    pub fn surface_response(&self, wavenumber: Scalar, hz: Scalar) -> Result<CScalar, ConfigurationError> {
        Ok(self.at_frequency(hz)?.reflection(wavenumber))
    }
}

/// A [`LayerStack`] evaluated at one frequency.
#[derive(Debug, Clone)]
pub struct FrequencyResponse<'a> {
    stack: &'a LayerStack,
    hz: Scalar,
    /// `iωμⱼσⱼ` per layer, i.e. `−kⱼ²` under `e^{+iωt}`.
    iwmusigma: Vec<CScalar>,
    min_skin_depth: Scalar,
}

impl FrequencyResponse<'_> {
    /// Frequency in Hz.
    #[must_use]
    pub fn frequency(&self) -> Scalar {
        self.hz
    }

    /// Underlying stack.
    #[must_use]
    pub fn stack(&self) -> &LayerStack {
        self.stack
    }

    /// Smallest skin depth over all layers, in meters.
    #[must_use]
    pub fn min_skin_depth(&self) -> Scalar {
        self.min_skin_depth
    }

    /// Recursive TE reflection coefficient `rTE(λ)`.
    ///
    /// Works upward from the basement: each layer combines its intrinsic
    /// admittance `uⱼ/μⱼ` with the admittance below it, attenuated by
    /// `exp(−2uⱼhⱼ)`. The common `1/(iω)` factor cancels and is dropped.
    #[must_use]
    pub fn reflection(&self, wavenumber: Scalar) -> CScalar {
        let layers = self.stack.layers();
        let lambda2 = CScalar::new(wavenumber * wavenumber, 0.0);
        let n = layers.len();

        let u_last = (lambda2 + self.iwmusigma[n - 1]).sqrt();
        let mut below = u_last / layers[n - 1].permeability;
        for j in (0..n - 1).rev() {
            let u = (lambda2 + self.iwmusigma[j]).sqrt();
            let intrinsic = u / layers[j].permeability;
            let decay = (-2.0 * u * self.stack.thicknesses[j]).exp();
            let tanh = (1.0 - decay) / (1.0 + decay);
            below = intrinsic * (below + intrinsic * tanh) / (intrinsic + below * tanh);
        }

        let air = CScalar::new(wavenumber / VACUUM_PERMEABILITY, 0.0);
        (air - below) / (air + below)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::materials::ColeCole;

    #[test]
    fn rejects_mismatched_thicknesses() {
        let err = LayerStack::from_conductivities(vec![10.0, 20.0], &[0.1, 0.2]).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::LengthMismatch { what: "thicknesses", expected: 1, found: 2 }
        );
    }

    #[test]
    fn rejects_non_positive_thickness() {
        let err = LayerStack::from_conductivities(vec![10.0, 0.0], &[0.1, 0.2, 0.3]).unwrap_err();
        assert_eq!(err, ConfigurationError::NonPositiveThickness { index: 1, value: 0.0 });
    }

    #[test]
    fn rejects_empty_stack() {
        assert_eq!(
            LayerStack::from_conductivities(Vec::new(), &[]).unwrap_err(),
            ConfigurationError::EmptyLayerStack
        );
    }

    #[test]
    fn half_space_reflection_matches_closed_form() {
        let stack = LayerStack::half_space(0.5).unwrap();
        let hz = 1.0e3;
        let lambda = 0.03;
        let u = (CScalar::new(lambda * lambda, 0.0) + J * angular_frequency(hz) * VACUUM_PERMEABILITY * 0.5).sqrt();
        let expected = (lambda - u) / (lambda + u);
        let r = stack.surface_response(lambda, hz).unwrap();
        assert_relative_eq!(r.re, expected.re, max_relative = 1.0e-14);
        assert_relative_eq!(r.im, expected.im, max_relative = 1.0e-14);
    }

    #[test]
    fn uniform_layers_collapse_to_half_space() {
        let layered = LayerStack::from_conductivities(vec![3.0, 7.0, 11.0], &[0.2; 4]).unwrap();
        let half = LayerStack::half_space(0.2).unwrap();
        for lambda in [1.0e-4, 1.0e-2, 1.0, 1.0e2] {
            let a = layered.surface_response(lambda, 250.0).unwrap();
            let b = half.surface_response(lambda, 250.0).unwrap();
            // |rTE| <= 1, so an absolute floor near f64 resolution is enough.
            assert_relative_eq!((a - b).norm(), 0.0, epsilon = 1.0e-12 * b.norm() + 1.0e-15);
        }
    }

    #[test]
    fn insulating_earth_does_not_reflect() {
        let stack = LayerStack::from_conductivities(vec![5.0], &[0.0, 0.0]).unwrap();
        assert!(stack.surface_response(0.7, 10.0).unwrap().norm() < 1.0e-15);
    }

    #[test]
    fn permeable_half_space_reflects_at_dc_limit() {
        // Static limit: rTE → (μ − μ₀)/(μ + μ₀) for a magnetic half-space.
        let mu = 2.0 * VACUUM_PERMEABILITY;
        let stack = LayerStack::new(Vec::new(), vec![LayerMaterial::conductive(1.0e-6).with_permeability(mu)]).unwrap();
        let r = stack.surface_response(1.0, 1.0e-3).unwrap();
        assert_relative_eq!(r.re, 1.0 / 3.0, max_relative = 1.0e-6);
    }

    #[test]
    fn dispersion_enters_through_complex_conductivity() {
        let cc = ColeCole::new(0.4, 1.0e-2, 0.7).unwrap();
        let dispersive = LayerStack::new(Vec::new(), vec![LayerMaterial::conductive(1.0).with_dispersion(cc)]).unwrap();
        let plain = LayerStack::half_space(1.0).unwrap();
        let a = dispersive.surface_response(0.01, 30.0).unwrap();
        let b = plain.surface_response(0.01, 30.0).unwrap();
        assert!((a - b).norm() > 1.0e-6);
    }

    #[test]
    fn rejects_non_positive_frequency() {
        let stack = LayerStack::half_space(1.0).unwrap();
        assert!(stack.at_frequency(0.0).is_err());
        assert!(stack.at_frequency(-5.0).is_err());
    }
}
