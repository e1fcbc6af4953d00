//! Layer material models and Cole-Cole conductivity dispersion.
//!
//! The supplied conductivity of a dispersive layer is its high-frequency
//! limit σ∞; the Cole-Cole law lowers it towards σ∞(1 − η) at DC:
//!
//! ```text
//! σ(ω) = σ∞ − σ∞ η / (1 + (1 − η)(iωτ)^c)
//! ```
//!
//! Time dependence is `e^{+iωt}` throughout the crate.

use nalgebra::DMatrix;

use crate::constants::{angular_frequency, VACUUM_PERMEABILITY};
use crate::errors::ConfigurationError;
use crate::math::{CScalar, Scalar, J};

/// Cole-Cole dispersion parameters of one layer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColeCole {
    /// Chargeability η, dimensionless in [0, 1).
    pub eta: Scalar,
    /// Time constant τ in seconds.
    pub tau: Scalar,
    /// Frequency exponent c in (0, 1].
    pub c: Scalar,
}

impl ColeCole {
    /// Parameters that leave the conductivity untouched.
    pub const NONE: Self = Self { eta: 0.0, tau: 1.0, c: 1.0 };

    /// Creates validated dispersion parameters.
    pub fn new(eta: Scalar, tau: Scalar, c: Scalar) -> Result<Self, ConfigurationError> {
        let model = Self { eta, tau, c };
        model.validate(0)?;
        Ok(model)
    }

    /// True when the layer has no dispersion.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.eta == 0.0
    }

    pub(crate) fn validate(&self, index: usize) -> Result<(), ConfigurationError> {
        let bad = |parameter, value| ConfigurationError::InvalidDispersion { index, parameter, value };
        if !(0.0..1.0).contains(&self.eta) {
            return Err(bad("eta", self.eta));
        }
        if !(self.tau > 0.0 && self.tau.is_finite()) {
            return Err(bad("tau", self.tau));
        }
        if !(self.c > 0.0 && self.c <= 1.0) {
            return Err(bad("c", self.c));
        }
        Ok(())
    }

    /// Complex conductivity at `hz` for high-frequency conductivity `sigma`.
    ///
    /// With η = 0 the input is returned bit-for-bit as a real number.
    #[must_use]
    pub fn complex_conductivity(&self, sigma: Scalar, hz: Scalar) -> CScalar {
        if self.is_inert() {
            return CScalar::new(sigma, 0.0);
        }
        let iwt = J * (angular_frequency(hz) * self.tau);
        let denom = 1.0 + (1.0 - self.eta) * iwt.powf(self.c);
        CScalar::new(sigma, 0.0) - sigma * self.eta / denom
    }
}

impl Default for ColeCole {
    fn default() -> Self {
        Self::NONE
    }
}

/// Trait for frequency-dependent conductivity models.
pub trait DispersiveMaterial {
    /// Returns the complex conductivity (S/m) at linear frequency `hz`.
    fn complex_conductivity(&self, hz: Scalar) -> CScalar;
}

/// Physical properties of one earth layer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerMaterial {
    /// Conductivity σ in S/m (high-frequency limit when dispersive).
    pub conductivity: Scalar,
    /// Magnetic permeability μ in H/m.
    pub permeability: Scalar,
    /// Cole-Cole parameters.
    pub dispersion: ColeCole,
}

impl LayerMaterial {
    /// Non-dispersive, non-magnetic layer.
    #[must_use]
    pub const fn conductive(conductivity: Scalar) -> Self {
        Self {
            conductivity,
            permeability: VACUUM_PERMEABILITY,
            dispersion: ColeCole::NONE,
        }
    }

    /// Attaches Cole-Cole dispersion.
    #[must_use]
    pub fn with_dispersion(mut self, dispersion: ColeCole) -> Self {
        self.dispersion = dispersion;
        self
    }

    /// Overrides the permeability.
    #[must_use]
    pub fn with_permeability(mut self, permeability: Scalar) -> Self {
        self.permeability = permeability;
        self
    }

    pub(crate) fn validate(&self, index: usize) -> Result<(), ConfigurationError> {
        if !(self.conductivity >= 0.0 && self.conductivity.is_finite()) {
            return Err(ConfigurationError::InvalidConductivity { index, value: self.conductivity });
        }
        if !(self.permeability > 0.0 && self.permeability.is_finite()) {
            return Err(ConfigurationError::NonPositivePermeability { index, value: self.permeability });
        }
        self.dispersion.validate(index)
    }
}

impl DispersiveMaterial for LayerMaterial {
    fn complex_conductivity(&self, hz: Scalar) -> CScalar {
        self.dispersion.complex_conductivity(self.conductivity, hz)
    }
}

/// Evaluates every layer at every frequency; entry `(layer, frequency)`.
#[must_use]
pub fn complex_conductivity_table<M: DispersiveMaterial>(layers: &[M], frequencies: &[Scalar]) -> DMatrix<CScalar> {
    DMatrix::from_fn(layers.len(), frequencies.len(), |i, j| {
        layers[i].complex_conductivity(frequencies[j])
    })
}
