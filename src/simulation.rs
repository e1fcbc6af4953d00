//! Forward simulation of a frequency-domain survey over a layered earth.
//!
//! [`Simulation1DLayered`] owns the fixed parts of the earth model
//! (thicknesses, permeabilities, Cole-Cole parameters, topography) and a
//! [`ConductivityMap`] that turns an inversion model vector into layer
//! conductivities. Each call to [`Simulation1DLayered::predict`] builds a
//! fresh [`LayerStack`] and never mutates the simulation.

use std::sync::Arc;

use nalgebra::DMatrix;

use crate::constants::VACUUM_PERMEABILITY;
use crate::errors::{ConfigurationError, EmError, EmResult, NumericalError, NumericalWarning};
use crate::filters::FilterTable;
use crate::kernel::HankelKernelEvaluator;
use crate::layers::LayerStack;
use crate::materials::{complex_conductivity_table, ColeCole, LayerMaterial};
use crate::math::{CScalar, Scalar};
use crate::sources::Discretisation;
use crate::superposition::FieldSuperposer;
use crate::survey::{DataType, Source, Survey};

/// Settings of a forward simulation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Human-readable identifier used in log output.
    pub name: String,
    /// Evaluate sources concurrently (needs the `parallel` feature).
    pub parallel: bool,
    /// Gauss-Legendre points per wire side or ring arc, 1..=8.
    pub wire_quadrature_points: usize,
    /// Arcs discretising a circular loop for receivers off its axis.
    pub ring_arcs: usize,
    /// Offsets below this (m) count as zero.
    pub zero_offset_tolerance: Scalar,
    /// Fold mirror-symmetric wire sides when the receiver allows it.
    pub fold_mirror_symmetry: bool,
}

impl SimulationConfig {
    /// Default settings under the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parallel: true,
            wire_quadrature_points: 3,
            ring_arcs: 36,
            zero_offset_tolerance: 1.0e-8,
            fold_mirror_symmetry: false,
        }
    }

    /// Enables or disables source-level parallelism.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the Gauss-Legendre order for wire sides and ring arcs.
    #[must_use]
    pub fn with_quadrature_points(mut self, points: usize) -> Self {
        self.wire_quadrature_points = points;
        self
    }

    /// Sets the number of arcs for off-axis ring evaluation.
    #[must_use]
    pub fn with_ring_arcs(mut self, arcs: usize) -> Self {
        self.ring_arcs = arcs;
        self
    }

    /// Sets the zero-offset tolerance in meters.
    #[must_use]
    pub fn with_zero_offset_tolerance(mut self, tolerance: Scalar) -> Self {
        self.zero_offset_tolerance = tolerance;
        self
    }

    /// Enables mirror folding of wire polygons.
    #[must_use]
    pub fn with_mirror_folding(mut self, fold: bool) -> Self {
        self.fold_mirror_symmetry = fold;
        self
    }

    /// Rejects out-of-range settings.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(1..=8).contains(&self.wire_quadrature_points) {
            return Err(ConfigurationError::InvalidSetting(format!(
                "wire_quadrature_points must be in 1..=8, got {}",
                self.wire_quadrature_points
            )));
        }
        if self.ring_arcs < 3 {
            return Err(ConfigurationError::InvalidSetting(format!(
                "ring_arcs must be at least 3, got {}",
                self.ring_arcs
            )));
        }
        if !(self.zero_offset_tolerance > 0.0 && self.zero_offset_tolerance.is_finite()) {
            return Err(ConfigurationError::InvalidSetting(format!(
                "zero_offset_tolerance must be positive, got {}",
                self.zero_offset_tolerance
            )));
        }
        Ok(())
    }

    /// Source discretisation derived from these settings.
    #[must_use]
    pub fn discretisation(&self) -> Discretisation {
        Discretisation {
            quadrature_points: self.wire_quadrature_points,
            ring_arcs: self.ring_arcs,
            zero_offset_tolerance: self.zero_offset_tolerance,
            fold_mirror_symmetry: self.fold_mirror_symmetry,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new("layered-em")
    }
}

/// Maps an inversion model vector onto layer conductivities (S/m).
pub trait ConductivityMap: Send + Sync {
    /// Returns one conductivity per layer.
    fn conductivity(&self, model: &[Scalar]) -> Result<Vec<Scalar>, ConfigurationError>;
}

/// Model values are conductivities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityMap;

impl ConductivityMap for IdentityMap {
    fn conductivity(&self, model: &[Scalar]) -> Result<Vec<Scalar>, ConfigurationError> {
        Ok(model.to_vec())
    }
}

/// Model values are natural-log conductivities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpMap;

impl ConductivityMap for ExpMap {
    fn conductivity(&self, model: &[Scalar]) -> Result<Vec<Scalar>, ConfigurationError> {
        Ok(model.iter().map(|m| m.exp()).collect())
    }
}

impl<F> ConductivityMap for F
where
    F: Fn(&[Scalar]) -> Vec<Scalar> + Send + Sync,
{
    fn conductivity(&self, model: &[Scalar]) -> Result<Vec<Scalar>, ConfigurationError> {
        Ok(self(model))
    }
}

/// Trait for forward engines consumed by an inversion.
pub trait ForwardSimulation {
    /// Length of the predicted data vector.
    fn n_data(&self) -> usize;

    /// Predicted data for `model`.
    fn dpred(&self, model: &[Scalar]) -> EmResult<Vec<Scalar>>;
}

/// Accuracy warning tied to one datum.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedWarning {
    /// Source position in the survey.
    pub source_index: usize,
    /// Receiver position within the source.
    pub receiver_index: usize,
    /// What was detected.
    pub warning: NumericalWarning,
}

/// Predicted data plus the warnings raised while computing it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictionReport {
    /// Data in survey order.
    pub data: Vec<Scalar>,
    /// Accuracy warnings, in survey order.
    pub warnings: Vec<ReportedWarning>,
}

/// Frequency-domain forward simulation over a 1D layered earth.
#[derive(Debug, Clone)]
pub struct Simulation1DLayered<M = IdentityMap> {
    survey: Survey,
    thicknesses: Vec<Scalar>,
    permeability: Vec<Scalar>,
    dispersion: Vec<ColeCole>,
    topography: Scalar,
    filter: Option<Arc<FilterTable>>,
    map: M,
    config: SimulationConfig,
}

impl<M: ConductivityMap> Simulation1DLayered<M> {
    /// Builds a simulation for `thicknesses.len() + 1` layers.
    pub fn new(survey: Survey, thicknesses: Vec<Scalar>, map: M, config: SimulationConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        for (index, &value) in thicknesses.iter().enumerate() {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigurationError::NonPositiveThickness { index, value });
            }
        }
        let n_layers = thicknesses.len() + 1;
        let simulation = Self {
            survey,
            thicknesses,
            permeability: vec![VACUUM_PERMEABILITY; n_layers],
            dispersion: vec![ColeCole::NONE; n_layers],
            topography: 0.0,
            filter: None,
            map,
            config,
        };
        simulation.check_elevations()?;
        Ok(simulation)
    }

    /// Attaches per-layer Cole-Cole parameters.
    pub fn with_dispersion(mut self, dispersion: Vec<ColeCole>) -> Result<Self, ConfigurationError> {
        self.expect_layers("dispersion", dispersion.len())?;
        for (index, model) in dispersion.iter().enumerate() {
            model.validate(index)?;
        }
        self.dispersion = dispersion;
        Ok(self)
    }

    /// Attaches per-layer permeabilities (H/m).
    pub fn with_permeability(mut self, permeability: Vec<Scalar>) -> Result<Self, ConfigurationError> {
        self.expect_layers("permeability", permeability.len())?;
        for (index, &value) in permeability.iter().enumerate() {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigurationError::NonPositivePermeability { index, value });
            }
        }
        self.permeability = permeability;
        Ok(self)
    }

    /// Moves the earth surface to elevation `topography`.
    pub fn with_topography(mut self, topography: Scalar) -> Result<Self, ConfigurationError> {
        if !topography.is_finite() {
            return Err(ConfigurationError::InvalidSetting(format!("topography {topography} is not finite")));
        }
        self.topography = topography;
        self.check_elevations()?;
        Ok(self)
    }

    /// Evaluates every transform with `filter` instead of the bundled table.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterTable) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    fn expect_layers(&self, what: &'static str, found: usize) -> Result<(), ConfigurationError> {
        if found == self.n_layers() {
            Ok(())
        } else {
            Err(ConfigurationError::LengthMismatch { what, expected: self.n_layers(), found })
        }
    }

    fn check_elevations(&self) -> Result<(), ConfigurationError> {
        let surface = self.topography;
        for source in self.survey.sources() {
            let elevation = source.geometry.elevation();
            if elevation < surface {
                return Err(ConfigurationError::BelowSurface { what: "source", elevation, surface });
            }
            for receiver in &source.receivers {
                let elevation = receiver.location.z;
                if elevation < surface {
                    return Err(ConfigurationError::BelowSurface { what: "receiver", elevation, surface });
                }
            }
        }
        Ok(())
    }

    /// The survey.
    #[must_use]
    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    /// The settings.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of earth layers.
    #[must_use]
    pub fn n_layers(&self) -> usize {
        self.thicknesses.len() + 1
    }

    /// Layer thicknesses.
    #[must_use]
    pub fn thicknesses(&self) -> &[Scalar] {
        &self.thicknesses
    }

    /// Filter used for the Hankel transforms.
    #[must_use]
    pub fn filter(&self) -> &FilterTable {
        self.filter.as_deref().unwrap_or_else(|| FilterTable::standard())
    }

    /// Surface elevation.
    #[must_use]
    pub fn topography(&self) -> Scalar {
        self.topography
    }

    /// Layered earth described by `model`.
    pub fn layer_stack(&self, model: &[Scalar]) -> EmResult<LayerStack> {
        let conductivity = self.map.conductivity(model)?;
        self.expect_layers("conductivity", conductivity.len())?;
        let layers = conductivity
            .iter()
            .zip(&self.permeability)
            .zip(&self.dispersion)
            .map(|((&sigma, &mu), &cc)| LayerMaterial::conductive(sigma).with_permeability(mu).with_dispersion(cc))
            .collect();
        Ok(LayerStack::new(self.thicknesses.clone(), layers)?.with_topography(self.topography)?)
    }

    /// Complex conductivity of every layer at every frequency, `(layer, frequency)`.
    pub fn compute_complex_sigma(&self, model: &[Scalar], frequencies: &[Scalar]) -> EmResult<DMatrix<CScalar>> {
        if let Some(&hz) = frequencies.iter().find(|&&hz| !(hz > 0.0 && hz.is_finite())) {
            return Err(ConfigurationError::NonPositiveFrequency(hz).into());
        }
        let stack = self.layer_stack(model)?;
        Ok(complex_conductivity_table(stack.layers(), frequencies))
    }

    /// Predicted data vector for `model`.
    pub fn predict(&self, model: &[Scalar]) -> EmResult<Vec<Scalar>> {
        Ok(self.predict_with_report(model)?.data)
    }

    /// Predicted data vector plus accuracy warnings.
    pub fn predict_with_report(&self, model: &[Scalar]) -> EmResult<PredictionReport> {
        let stack = self.layer_stack(model)?;
        log::debug!(
            "{}: {} sources, {} data, {} layers",
            self.config.name,
            self.survey.sources().len(),
            self.survey.n_data(),
            stack.n_layers()
        );

        let outputs = self.map_sources(|index, source| self.evaluate_source(index, source, &stack))?;
        let mut report = PredictionReport {
            data: Vec::with_capacity(self.survey.n_data()),
            warnings: Vec::new(),
        };
        for output in outputs {
            report.data.extend(output.data);
            report.warnings.extend(output.warnings);
        }
        for reported in &report.warnings {
            log::warn!(
                "{}: source {} receiver {}: {}",
                self.config.name,
                reported.source_index,
                reported.receiver_index,
                reported.warning
            );
        }
        Ok(report)
    }

    #[cfg(feature = "parallel")]
    fn map_sources<T, F>(&self, f: F) -> EmResult<Vec<T>>
    where
        T: Send,
        F: Fn(usize, &Source) -> EmResult<T> + Sync + Send,
    {
        use rayon::prelude::*;

        let sources = self.survey.sources();
        if self.config.parallel {
            sources.par_iter().enumerate().map(|(i, s)| f(i, s)).collect()
        } else {
            sources.iter().enumerate().map(|(i, s)| f(i, s)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn map_sources<T, F>(&self, f: F) -> EmResult<Vec<T>>
    where
        F: Fn(usize, &Source) -> EmResult<T>,
    {
        self.survey.sources().iter().enumerate().map(|(i, s)| f(i, s)).collect()
    }

    fn evaluate_source(&self, source_index: usize, source: &Source, stack: &LayerStack) -> EmResult<PredictionReport> {
        log::trace!(
            "{}: source {source_index} at {} Hz, {} receivers",
            self.config.name,
            source.frequency,
            source.receivers.len()
        );
        let response = stack.at_frequency(source.frequency)?;
        let filter = self.filter.as_deref().unwrap_or_else(|| FilterTable::standard());
        let evaluator = HankelKernelEvaluator::new(&response, self.config.zero_offset_tolerance).with_filter(filter);
        let superposer = FieldSuperposer::new(evaluator);
        let discretisation = self.config.discretisation();

        let mut output = PredictionReport {
            data: Vec::with_capacity(source.n_data()),
            warnings: Vec::new(),
        };
        for (receiver_index, receiver) in source.receivers.iter().enumerate() {
            let axis = receiver.orientation.unit();
            let contributions = source.geometry.contributions_for(&receiver.location, &axis, &discretisation);
            let mut warnings = Vec::new();
            let secondary = superposer.combine(&contributions, &receiver.location, &axis, &mut warnings)?;

            let value = match receiver.data_type {
                DataType::SecondaryField => secondary,
                DataType::Field => secondary + source.geometry.primary_field(&receiver.location).dot(&axis),
                DataType::Ppm => {
                    let primary = source.geometry.primary_field(&receiver.location);
                    let along = primary.dot(&axis);
                    if along == 0.0 || along.abs() <= 1.0e-12 * primary.norm() {
                        return Err(NumericalError::ZeroPrimaryField.into());
                    }
                    secondary * (1.0e6 / along)
                }
            };
            if !(value.re.is_finite() && value.im.is_finite()) {
                return Err(EmError::from(NumericalError::NonFinite { source_index, receiver_index }));
            }

            receiver.component.extend(value, &mut output.data);
            output.warnings.extend(warnings.into_iter().map(|warning| ReportedWarning {
                source_index,
                receiver_index,
                warning,
            }));
        }
        Ok(output)
    }
}

impl<M: ConductivityMap> ForwardSimulation for Simulation1DLayered<M> {
    fn n_data(&self) -> usize {
        self.survey.n_data()
    }

    fn dpred(&self, model: &[Scalar]) -> EmResult<Vec<Scalar>> {
        self.predict(model)
    }
}
