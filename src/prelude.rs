//! Convenience re-exports for building layered-earth forward simulations.

pub use crate::constants::*;
pub use crate::errors::{ConfigurationError, EmError, EmResult, GeometryError, NumericalError, NumericalWarning};
pub use crate::fields::{dipole_field, polygon_field, ring_field, segment_field};
pub use crate::filters::{FilterTable, HankelOrder};
pub use crate::kernel::HankelKernelEvaluator;
pub use crate::layers::{FrequencyResponse, LayerStack};
pub use crate::materials::{complex_conductivity_table, ColeCole, DispersiveMaterial, LayerMaterial};
pub use crate::math::{relative_l2_error, CScalar, Scalar, C3, R3};
pub use crate::simulation::{
    ConductivityMap,
    ExpMap,
    ForwardSimulation,
    IdentityMap,
    PredictionReport,
    ReportedWarning,
    Simulation1DLayered,
    SimulationConfig,
};
pub use crate::sources::{Contribution, Discretisation, ElementKind, Orientation, SourceGeometry, WirePolygon};
pub use crate::superposition::FieldSuperposer;
pub use crate::survey::{Component, DataType, Receiver, Source, Survey};
pub use crate::sweep::{linspace, logspace_hz};
