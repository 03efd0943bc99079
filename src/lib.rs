//! # fleetmap
//!
//! Camera animation and fleet data plumbing for a vehicle tracking map.
//!
//! Selecting a vehicle flies the camera there in three legs (zoom out, pan,
//! zoom in) whose zoom-out depth scales with the log of the travel distance.
//! Vehicle data is polled from a [`FleetSource`] in the background and merged
//! into a [`FleetRegistry`]; the map itself sits behind the [`MapSurface`]
//! trait.

pub mod animation;
pub mod core;
pub mod fleet;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{AnimationProfile, CameraConfig, FleetMapConfig, PollingConfig},
    geo::{haversine_distance, LatLng, LatLngBounds, EARTH_RADIUS_M},
    map::{HeadlessMap, MapResources},
    viewport::Viewport,
};

pub use animation::{
    animator::{CameraAnimator, CameraEvent},
    interpolation::EasingFunction,
    sequencer::{CameraCommand, CameraSequencer, SequenceState},
    transitions::{RequestId, Transition, TransitionRequest, TransitionStep, TransitionTag},
    zoom::ZoomInterpolator,
};

pub use fleet::{
    feed::{FleetPoller, FleetUpdate},
    model::{DisplayStatus, VehicleDetail, VehicleId, VehicleStatus, VehicleSummary},
    registry::{DetailState, FleetEntry, FleetRegistry, FleetStats},
};

pub use layers::marker::{MarkerStyle, VehicleMarker};
pub use traits::{FleetSource, MapSurface, SurfaceEvent};
pub use ui::popup::{PopupAction, VehiclePopup};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Unknown vehicle: {0}")]
    UnknownVehicle(fleet::model::VehicleId),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Update channel closed")]
    ChannelClosed,
}

/// Error type alias for convenience
pub type Error = MapError;
