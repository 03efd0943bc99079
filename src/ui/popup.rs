use crate::{
    core::{constants::POPUP_OFFSET, geo::LatLng},
    fleet::{model::VehicleId, registry::FleetEntry},
};

/// Buttons inside the vehicle popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupAction {
    Close,
    OpenDetail(VehicleId),
}

/// Info overlay anchored above a vehicle marker
#[derive(Debug, Clone, PartialEq)]
pub struct VehiclePopup {
    pub vehicle_id: VehicleId,
    /// Anchor coordinate (the marker position)
    pub position: LatLng,
    pub title: String,
    /// Reported coordinates, shown when the vehicle detail has loaded
    pub coordinates: Option<LatLng>,
    pub speed_kmh: f64,
    /// Pixel offset from the anchor
    pub offset: (f64, f64),
}

impl VehiclePopup {
    pub fn new(vehicle_id: VehicleId, position: LatLng, title: impl Into<String>) -> Self {
        Self {
            vehicle_id,
            position,
            title: title.into(),
            coordinates: None,
            speed_kmh: 0.0,
            offset: POPUP_OFFSET,
        }
    }

    /// Popup for a registry entry anchored at `position`
    pub fn for_entry(entry: &FleetEntry, position: LatLng) -> Self {
        let mut popup = Self::new(entry.id(), position, entry.summary.name.clone());
        popup.coordinates = entry.detail.detail().map(|detail| detail.position());
        popup.speed_kmh = entry.speed();
        popup
    }

    /// Text rows in display order
    pub fn content_lines(&self) -> Vec<String> {
        let mut lines = vec![self.title.clone()];
        if let Some(coords) = self.coordinates {
            lines.push(format!("Lat: {}, Lon: {}", coords.lat, coords.lng));
        }
        lines.push(format!("Speed: {} km/h", self.speed_kmh));
        lines
    }

    /// Actions the popup offers
    pub fn actions(&self) -> [PopupAction; 2] {
        [PopupAction::Close, PopupAction::OpenDetail(self.vehicle_id)]
    }
}
