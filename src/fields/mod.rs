//! Free-space (primary) magnetic fields of transmitter elements.

mod magnetic;
mod segment;

pub use magnetic::{dipole_field, ring_field};
pub use segment::{polygon_field, segment_field};
