//! Shared error types used across submodules.
//!
//! Every failure in the forward engine is a deterministic function of its
//! inputs: there is nothing to retry. Configuration problems are detected
//! before any field evaluation; geometry and numerical problems abort the
//! whole prediction.

use thiserror::Error;

use crate::math::Scalar;

/// Malformed model, survey or simulation settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Two parallel vectors disagree in length.
    #[error("{what}: expected length {expected}, found {found}")]
    LengthMismatch {
        /// Name of the offending vector.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        found: usize,
    },
    /// At least one earth layer is required.
    #[error("layer stack must contain at least one layer")]
    EmptyLayerStack,
    /// Finite layers need a strictly positive thickness.
    #[error("layer {index} has non-positive thickness {value}")]
    NonPositiveThickness {
        /// Index of the layer.
        index: usize,
        /// Supplied thickness in meters.
        value: Scalar,
    },
    /// Conductivity must be finite and non-negative.
    #[error("layer {index} has invalid conductivity {value}")]
    InvalidConductivity {
        /// Index of the layer.
        index: usize,
        /// Supplied conductivity in S/m.
        value: Scalar,
    },
    /// Permeability must be finite and strictly positive.
    #[error("layer {index} has non-positive permeability {value}")]
    NonPositivePermeability {
        /// Index of the layer.
        index: usize,
        /// Supplied permeability in H/m.
        value: Scalar,
    },
    /// Cole-Cole parameter outside its admissible range.
    #[error("layer {index}: invalid Cole-Cole {parameter} = {value}")]
    InvalidDispersion {
        /// Index of the layer.
        index: usize,
        /// Parameter name (`eta`, `tau` or `c`).
        parameter: &'static str,
        /// Supplied value.
        value: Scalar,
    },
    /// Frequencies must be strictly positive.
    #[error("frequency must be positive, got {0} Hz")]
    NonPositiveFrequency(Scalar),
    /// Wire polygons need at least three distinct vertices.
    #[error("wire loop needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    /// Wire polygons must lie in a horizontal plane.
    #[error("wire loop vertices must share one elevation")]
    NonHorizontalLoop,
    /// Orientation token other than `x`, `y` or `z`.
    #[error("unsupported orientation `{0}`")]
    UnsupportedOrientation(String),
    /// Orientation vectors must be non-zero and finite.
    #[error("orientation vector must be non-zero")]
    ZeroOrientation,
    /// Component token other than `real`, `imag` or `both`.
    #[error("unsupported component `{0}`")]
    UnsupportedComponent(String),
    /// Sources and receivers live in the air above the layered earth.
    #[error("{what} at elevation {elevation} m lies below the surface at {surface} m")]
    BelowSurface {
        /// What was misplaced (source or receiver).
        what: &'static str,
        /// Elevation of the element.
        elevation: Scalar,
        /// Surface elevation.
        surface: Scalar,
    },
    /// Source strength (moment, current, radius, turns) must be positive and finite.
    #[error("invalid source parameter {parameter} = {value}")]
    InvalidSourceParameter {
        /// Parameter name.
        parameter: &'static str,
        /// Supplied value.
        value: Scalar,
    },
    /// Simulation settings are inconsistent.
    #[error("invalid simulation setting: {0}")]
    InvalidSetting(String),
    /// Hankel filter table is malformed.
    #[error("invalid filter table `{name}`: {reason}")]
    InvalidFilter {
        /// Table name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Source/receiver arrangements the kernel cannot evaluate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Horizontal offset too small for the offset-based filter.
    #[error("horizontal offset {offset} m is below the zero-offset tolerance")]
    ZeroOffset {
        /// Offending offset in meters.
        offset: Scalar,
    },
    /// Polygon encloses no area.
    #[error("wire loop encloses zero area")]
    ZeroArea,
    /// Two consecutive polygon vertices coincide.
    #[error("wire loop side {index} has zero length")]
    DegenerateSide {
        /// Index of the side.
        index: usize,
    },
    /// The closed-form ring kernel only holds on the loop axis.
    #[error("ring kernel requested {offset} m off the loop axis")]
    OffAxisRing {
        /// Horizontal distance from the loop centre in meters.
        offset: Scalar,
    },
    /// Two non-adjacent sides of a wire polygon cross.
    #[error("wire loop sides {first} and {second} intersect")]
    SelfIntersecting {
        /// Index of the first side.
        first: usize,
        /// Index of the second side.
        second: usize,
    },
}

/// Evaluation produced an unusable number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericalError {
    /// NaN or infinite field value.
    #[error("non-finite field value for source {source_index}, receiver {receiver_index}")]
    NonFinite {
        /// Source position in the survey.
        source_index: usize,
        /// Receiver position within the source.
        receiver_index: usize,
    },
    /// Ppm normalisation needs a non-zero primary field along the receiver axis.
    #[error("primary field vanishes along the receiver axis; ppm is undefined")]
    ZeroPrimaryField,
}

/// Top-level error type for the crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmError {
    /// Wraps configuration errors.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// Wraps geometry errors.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// Wraps numerical errors.
    #[error(transparent)]
    Numerical(#[from] NumericalError),
}

/// Convenience alias for results carrying [`EmError`].
pub type EmResult<T> = Result<T, EmError>;

/// Non-fatal accuracy warning raised when a sample falls outside the range
/// the digital filter was validated for. The result is still returned.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericalWarning {
    /// Offset is many skin depths; the kernel oscillates faster than the filter resolves.
    OffsetBeyondSkinDepths {
        /// Horizontal offset in meters.
        offset: Scalar,
        /// Smallest skin depth in the stack, meters.
        skin_depth: Scalar,
        /// Frequency in Hz.
        frequency: Scalar,
    },
    /// Source/receiver elevation dwarfs the offset; the kernel decays before the first abscissa.
    HeightBeyondOffset {
        /// Horizontal offset in meters.
        offset: Scalar,
        /// Summed source and receiver heights in meters.
        height: Scalar,
    },
}

impl std::fmt::Display for NumericalWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OffsetBeyondSkinDepths { offset, skin_depth, frequency } => write!(
                f,
                "offset {offset:.3e} m spans {:.1} skin depths at {frequency:.3e} Hz; filter truncation likely",
                offset / skin_depth
            ),
            Self::HeightBeyondOffset { offset, height } => write!(
                f,
                "height {height:.3e} m is {:.1}x the offset {offset:.3e} m; filter truncation likely",
                height / offset
            ),
        }
    }
}
