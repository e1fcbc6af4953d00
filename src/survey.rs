//! Survey description: sources, their frequency and their receivers.
//!
//! The survey fixes the order of the predicted data vector: sources in order,
//! then each source's receivers in order, then `[real, imag]` for receivers
//! asking for both parts.

use std::str::FromStr;

use crate::errors::{ConfigurationError, EmError};
use crate::math::{CScalar, Scalar, R3};
use crate::sources::SourceGeometry;

pub use crate::sources::Orientation;

/// Part of the complex field a receiver reports.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// In-phase part.
    Real,
    /// Quadrature part.
    Imag,
    /// Both, real first.
    Both,
}

impl Component {
    /// Number of data values produced.
    #[must_use]
    pub const fn n_values(self) -> usize {
        match self {
            Self::Both => 2,
            Self::Real | Self::Imag => 1,
        }
    }

    /// Appends the requested part(s) of `value` to `out`.
    pub fn extend(self, value: CScalar, out: &mut Vec<Scalar>) {
        match self {
            Self::Real => out.push(value.re),
            Self::Imag => out.push(value.im),
            Self::Both => out.extend([value.re, value.im]),
        }
    }
}

impl FromStr for Component {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "real" => Ok(Self::Real),
            "imag" => Ok(Self::Imag),
            "both" => Ok(Self::Both),
            _ => Err(ConfigurationError::UnsupportedComponent(s.to_owned())),
        }
    }
}

/// Quantity a receiver reports.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    /// Field of the induced currents only, A/m.
    #[default]
    SecondaryField,
    /// Primary plus secondary field, A/m.
    Field,
    /// Secondary over primary field along the receiver axis, parts per million.
    Ppm,
}

impl FromStr for DataType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "secondary" | "secondaryfield" | "secondary_field" => Ok(Self::SecondaryField),
            "field" | "total" => Ok(Self::Field),
            "ppm" => Ok(Self::Ppm),
            _ => Err(ConfigurationError::InvalidSetting(format!("unknown data type `{s}`"))),
        }
    }
}

/// Magnetic field receiver.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    /// Position in meters.
    pub location: R3,
    /// Measurement axis.
    pub orientation: Orientation,
    /// Reported part(s).
    pub component: Component,
    /// Reported quantity.
    pub data_type: DataType,
}

impl Receiver {
    /// Secondary-field receiver.
    #[must_use]
    pub fn new(location: R3, orientation: Orientation, component: Component) -> Self {
        Self {
            location,
            orientation,
            component,
            data_type: DataType::SecondaryField,
        }
    }

    /// Sets the reported quantity.
    #[must_use]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Number of data values this receiver produces.
    #[must_use]
    pub fn n_data(&self) -> usize {
        self.component.n_values()
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        self.orientation.validate()?;
        if !self.location.iter().all(|c| c.is_finite()) {
            return Err(ConfigurationError::InvalidSetting("receiver location is not finite".into()));
        }
        Ok(())
    }
}

/// Transmitter operating at one frequency, with its receivers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Transmitter shape.
    pub geometry: SourceGeometry,
    /// Frequency in Hz.
    pub frequency: Scalar,
    /// Receivers in output order.
    pub receivers: Vec<Receiver>,
}

impl Source {
    /// Builds a validated source.
    pub fn new(geometry: SourceGeometry, frequency: Scalar, receivers: Vec<Receiver>) -> Result<Self, EmError> {
        let source = Self { geometry, frequency, receivers };
        source.validate()?;
        Ok(source)
    }

    /// Checks frequency, geometry and receivers.
    pub fn validate(&self) -> Result<(), EmError> {
        if !(self.frequency > 0.0 && self.frequency.is_finite()) {
            return Err(ConfigurationError::NonPositiveFrequency(self.frequency).into());
        }
        self.geometry.validate()?;
        for receiver in &self.receivers {
            receiver.validate()?;
        }
        Ok(())
    }

    /// Number of data values this source produces.
    #[must_use]
    pub fn n_data(&self) -> usize {
        self.receivers.iter().map(Receiver::n_data).sum()
    }
}

/// Ordered collection of sources.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Survey {
    sources: Vec<Source>,
}

impl Survey {
    /// Builds a validated survey.
    pub fn new(sources: Vec<Source>) -> Result<Self, EmError> {
        for source in &sources {
            source.validate()?;
        }
        Ok(Self { sources })
    }

    /// Frequency sweep: one copy of `geometry` and `receivers` per frequency.
    pub fn frequency_sweep(
        geometry: &SourceGeometry,
        frequencies: &[Scalar],
        receivers: &[Receiver],
    ) -> Result<Self, EmError> {
        let sources = frequencies
            .iter()
            .map(|&hz| Source::new(geometry.clone(), hz, receivers.to_vec()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sources })
    }

    /// Sources in output order.
    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Length of the predicted data vector.
    #[must_use]
    pub fn n_data(&self) -> usize {
        self.sources.iter().map(Source::n_data).sum()
    }

    /// Frequency of every source, in order.
    #[must_use]
    pub fn frequencies(&self) -> Vec<Scalar> {
        self.sources.iter().map(|s| s.frequency).collect()
    }
}
