//! Seams between the camera logic and its collaborators
//!
//! The hosting map and the fleet API are both out of this crate's hands. The
//! camera code talks to them only through these traits.

use crate::{
    animation::transitions::{TransitionRequest, TransitionTag},
    core::{geo::LatLng, viewport::Viewport},
    fleet::model::{VehicleDetail, VehicleId, VehicleSummary},
    layers::marker::VehicleMarker,
    ui::popup::{PopupAction, VehiclePopup},
    Result,
};
use async_trait::async_trait;

/// Events a map surface reports back to the camera
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// A transition started with `ease_to` stopped moving. Surfaces may also
    /// report this for transitions that were interrupted by a newer one.
    TransitionComplete(TransitionTag),
    /// The user clicked a vehicle marker
    MarkerClicked(VehicleId),
    /// The user pressed a button inside the info popup
    Popup(PopupAction),
}

/// A live map the camera can drive.
///
/// The surface owns the viewport; callers only request changes. Only one
/// transition runs at a time: `ease_to` supersedes the running one.
pub trait MapSurface {
    /// The viewport as currently displayed
    fn viewport(&self) -> Viewport;

    /// Start an animated transition labelled with `tag`
    fn ease_to(&mut self, tag: TransitionTag, request: TransitionRequest);

    /// Move instantly, cancelling any running transition
    fn jump_to(&mut self, center: LatLng, zoom: f64);

    /// Add a marker, replacing one with the same vehicle id
    fn add_marker(&mut self, marker: &VehicleMarker);

    fn remove_marker(&mut self, vehicle_id: VehicleId);

    /// Show the info popup, replacing any other popup
    fn show_popup(&mut self, popup: &VehiclePopup);

    fn remove_popup(&mut self);
}

/// Where vehicle data comes from
#[async_trait]
pub trait FleetSource: Send + Sync {
    /// The current vehicle list
    async fn fetch_vehicles(&self) -> Result<Vec<VehicleSummary>>;

    /// Latest telemetry for one vehicle
    async fn fetch_detail(&self, id: VehicleId) -> Result<VehicleDetail>;
}
