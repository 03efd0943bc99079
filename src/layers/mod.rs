pub mod marker;

pub use marker::{MarkerStyle, VehicleMarker};
