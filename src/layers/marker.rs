use crate::{
    core::geo::LatLng,
    fleet::{
        model::{DisplayStatus, VehicleId},
        registry::FleetEntry,
    },
};

/// Pin colour of a vehicle marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerStyle {
    Moving,
    Parked,
    Maintenance,
    Inactive,
}

impl MarkerStyle {
    pub fn from_display_status(status: DisplayStatus) -> Self {
        match status {
            DisplayStatus::Moving => Self::Moving,
            DisplayStatus::Parked => Self::Parked,
            DisplayStatus::Maintenance => Self::Maintenance,
            DisplayStatus::Inactive | DisplayStatus::Unknown => Self::Inactive,
        }
    }

    /// Fill colour as a CSS hex string
    pub fn color_hex(&self) -> &'static str {
        match self {
            Self::Moving => "#22c55e",
            Self::Parked => "#eab308",
            Self::Maintenance => "#ef4444",
            Self::Inactive => "#94a3b8",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleMarker {
    vehicle_id: VehicleId,
    position: LatLng,
    style: MarkerStyle,
    label: String,
}

impl VehicleMarker {
    pub fn new(vehicle_id: VehicleId, position: LatLng, style: MarkerStyle) -> Self {
        Self {
            vehicle_id,
            position,
            style,
            label: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Marker for a registry entry; the style uses the freshest known speed
    pub fn for_entry(entry: &FleetEntry, position: LatLng) -> Self {
        let status = DisplayStatus::from_status(&entry.summary.status, entry.speed());
        Self::new(entry.id(), position, MarkerStyle::from_display_status(status))
            .with_label(entry.summary.name.clone())
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn style(&self) -> MarkerStyle {
        self.style
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
