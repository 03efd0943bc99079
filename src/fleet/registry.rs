//! Lookup table merging list records with their per-vehicle detail
//!
//! The list and the details arrive on separate schedules. Each vehicle in
//! the current list owns exactly one [`DetailState`]; a vehicle only has a map
//! position once its detail is [`DetailState::Loaded`].

use crate::core::geo::LatLng;
use crate::fleet::model::{VehicleDetail, VehicleId, VehicleStatus, VehicleSummary};
use crate::prelude::{HashMap, HashSet};
use crate::{MapError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(VehicleDetail),
    Unavailable(String),
}

impl DetailState {
    pub fn detail(&self) -> Option<&VehicleDetail> {
        match self {
            Self::Loaded(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FleetEntry {
    pub summary: VehicleSummary,
    pub detail: DetailState,
}

impl FleetEntry {
    pub fn id(&self) -> VehicleId {
        self.summary.id
    }

    /// Map position, if the detail has loaded with usable coordinates
    pub fn position(&self) -> Option<LatLng> {
        self.detail
            .detail()
            .map(VehicleDetail::position)
            .filter(LatLng::is_valid)
    }

    /// Detail speed when known, list speed otherwise
    pub fn speed(&self) -> f64 {
        self.detail
            .detail()
            .map_or(self.summary.speed, |detail| detail.speed)
    }
}

/// Counters shown above the vehicle list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FleetStats {
    pub total: usize,
    pub active: usize,
    pub parked: usize,
    pub maintenance: usize,
}

#[derive(Debug, Default)]
pub struct FleetRegistry {
    entries: HashMap<VehicleId, FleetEntry>,
    /// List order as served by the API
    order: Vec<VehicleId>,
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the vehicle list. New vehicles start as [`DetailState::Loading`],
    /// known vehicles keep their detail, vanished vehicles are dropped.
    ///
    /// Returns the ids that need a first detail fetch.
    pub fn apply_vehicle_list(&mut self, vehicles: Vec<VehicleSummary>) -> Vec<VehicleId> {
        let mut added = Vec::new();
        let mut order = Vec::with_capacity(vehicles.len());
        let mut listed = HashSet::default();

        for summary in vehicles {
            let id = summary.id;
            if listed.insert(id) {
                order.push(id);
            } else {
                log::warn!("duplicate vehicle {id} in list, keeping the last record");
            }
            match self.entries.get_mut(&id) {
                Some(entry) => entry.summary = summary,
                None => {
                    self.entries.insert(
                        id,
                        FleetEntry {
                            summary,
                            detail: DetailState::Loading,
                        },
                    );
                    added.push(id);
                }
            }
        }

        self.entries.retain(|id, _| listed.contains(id));
        self.order = order;

        log::debug!(
            "vehicle list applied: {} vehicles, {} new",
            self.order.len(),
            added.len()
        );
        added
    }

    /// Store a freshly fetched detail. Details for unlisted vehicles are ignored.
    pub fn apply_detail(&mut self, detail: VehicleDetail) -> bool {
        match self.entries.get_mut(&detail.vehicle_id) {
            Some(entry) => {
                entry.detail = DetailState::Loaded(detail);
                true
            }
            None => {
                log::debug!("ignoring detail for unlisted vehicle {}", detail.vehicle_id);
                false
            }
        }
    }

    /// Record a failed detail fetch. A vehicle that already loaded keeps its
    /// last good detail; only one that never loaded becomes unavailable.
    pub fn mark_unavailable(&mut self, id: VehicleId, reason: impl Into<String>) -> bool {
        match self.entries.get_mut(&id) {
            Some(FleetEntry {
                detail: DetailState::Loaded(_),
                ..
            }) => {
                log::warn!(
                    "detail refresh for vehicle {id} failed, keeping last position: {}",
                    reason.into()
                );
                false
            }
            Some(entry) => {
                let reason = reason.into();
                log::warn!("detail for vehicle {id} unavailable: {reason}");
                entry.detail = DetailState::Unavailable(reason);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: VehicleId) -> Option<&FleetEntry> {
        self.entries.get(&id)
    }

    /// Like [`FleetRegistry::get`], failing with [`MapError::UnknownVehicle`]
    pub fn entry(&self, id: VehicleId) -> Result<&FleetEntry> {
        self.entries.get(&id).ok_or(MapError::UnknownVehicle(id))
    }

    pub fn position_of(&self, id: VehicleId) -> Option<LatLng> {
        self.entries.get(&id).and_then(FleetEntry::position)
    }

    /// A vehicle can be selected once its position is known
    pub fn is_selectable(&self, id: VehicleId) -> bool {
        self.position_of(id).is_some()
    }

    /// Entries in list order
    pub fn iter(&self) -> impl Iterator<Item = &FleetEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Entries that can be drawn on the map, in list order
    pub fn mappable(&self) -> impl Iterator<Item = (&FleetEntry, LatLng)> {
        self.iter()
            .filter_map(|entry| entry.position().map(|position| (entry, position)))
    }

    pub fn ids(&self) -> Vec<VehicleId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn stats(&self) -> FleetStats {
        let mut stats = FleetStats {
            total: self.order.len(),
            ..FleetStats::default()
        };
        for entry in self.iter() {
            match entry.summary.status {
                VehicleStatus::Active => stats.active += 1,
                VehicleStatus::Inactive => stats.parked += 1,
                VehicleStatus::Maintenance => stats.maintenance += 1,
                VehicleStatus::Other(_) => {}
            }
        }
        stats
    }
}
