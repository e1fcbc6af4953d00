#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Fundamental physical constants used throughout the library.
pub mod constants;
/// Shared mathematical utilities (vectors, quadrature, elliptic integrals).
pub mod math;
/// Frequency sweep builders.
pub mod sweep;
/// Error types shared between modules.
pub mod errors;
/// Layer materials and Cole-Cole dispersion.
pub mod materials;
/// Digital linear filter for J0/J1 Hankel transforms.
pub mod filters;
/// Layered earth and TE reflection recursion.
pub mod layers;
/// Filter-driven evaluation of elementary sources.
pub mod kernel;
/// Transmitter geometries and their elementary contributions.
pub mod sources;
/// Free-space (primary) fields.
pub mod fields;
/// Superposition of elementary contributions.
pub mod superposition;
/// Sources, receivers and data ordering.
pub mod survey;
/// Forward simulation orchestration.
pub mod simulation;

/// Common exports for downstream crates.
pub mod prelude;
