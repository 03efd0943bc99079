//! Vehicle records as served by the fleet API

use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub u64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operational status reported by the API. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VehicleStatus {
    Active,
    Inactive,
    Maintenance,
    Other(String),
}

impl VehicleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Maintenance => "MAINTENANCE",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for VehicleStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ACTIVE" => Self::Active,
            "INACTIVE" => Self::Inactive,
            "MAINTENANCE" => Self::Maintenance,
            _ => Self::Other(raw),
        }
    }
}

impl From<VehicleStatus> for String {
    fn from(status: VehicleStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the status badge shows: status combined with current speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayStatus {
    Moving,
    Parked,
    Inactive,
    Maintenance,
    Unknown,
}

impl DisplayStatus {
    pub fn from_status(status: &VehicleStatus, speed: f64) -> Self {
        match status {
            VehicleStatus::Active if speed > 0.0 => Self::Moving,
            VehicleStatus::Active => Self::Parked,
            VehicleStatus::Inactive => Self::Inactive,
            VehicleStatus::Maintenance => Self::Maintenance,
            VehicleStatus::Other(_) => Self::Unknown,
        }
    }
}

/// Lightweight list record, refreshed with the vehicle list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: VehicleId,
    pub name: String,
    pub status: VehicleStatus,
    /// Last known speed in km/h
    pub speed: f64,
    pub updated_at: String,
}

impl VehicleSummary {
    pub fn display_status(&self) -> DisplayStatus {
        DisplayStatus::from_status(&self.status, self.speed)
    }
}

/// Telemetry snapshot for one vehicle, loaded per vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleDetail {
    #[serde(rename = "vehicleId")]
    pub vehicle_id: VehicleId,
    pub latitude: f64,
    pub longitude: f64,
    /// km/h
    pub speed: f64,
    pub fuel_level: f64,
    pub odometer: f64,
    pub timestamp: String,
}

impl VehicleDetail {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}
