//! Camera animator: drives the sequencer against a live map
//!
//! The animator is the single owner of "which vehicle is selected". It takes
//! selection signals and surface events, runs them through the
//! [`CameraSequencer`] and applies the resulting commands to the map held in
//! [`MapResources`].

use std::collections::VecDeque;

use crate::{
    animation::sequencer::{CameraCommand, CameraSequencer},
    core::{config::CameraConfig, geo::LatLng, map::MapResources},
    fleet::{model::VehicleId, registry::FleetRegistry},
    prelude::Instant,
    traits::{MapSurface, SurfaceEvent},
    ui::popup::{PopupAction, VehiclePopup},
    Result,
};

/// Notifications for the rest of the dashboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraEvent {
    /// The camera came to rest on the selected vehicle
    Settled { vehicle_id: VehicleId, position: LatLng },
    /// The selected vehicle was deselected
    SelectionCleared,
    /// The popup asked for the vehicle's detail page
    DetailRequested(VehicleId),
}

#[derive(Debug)]
pub struct CameraAnimator {
    sequencer: CameraSequencer,
    active_vehicle: Option<VehicleId>,
    events: VecDeque<CameraEvent>,
}

impl CameraAnimator {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            sequencer: CameraSequencer::new(config),
            active_vehicle: None,
            events: VecDeque::new(),
        }
    }

    pub fn sequencer(&self) -> &CameraSequencer {
        &self.sequencer
    }

    /// Vehicle the camera last settled on, while its popup is open
    pub fn active_vehicle(&self) -> Option<VehicleId> {
        self.active_vehicle
    }

    pub fn is_animating(&self) -> bool {
        !self.sequencer.is_idle()
    }

    pub fn select_vehicle<S: MapSurface>(
        &mut self,
        id: VehicleId,
        registry: &FleetRegistry,
        resources: &mut MapResources<S>,
    ) -> Result<bool> {
        self.select_vehicle_at(id, registry, resources, Instant::now())
    }

    /// Fly to a vehicle. Returns `Ok(false)` when the vehicle is unknown or
    /// has no position yet.
    pub fn select_vehicle_at<S: MapSurface>(
        &mut self,
        id: VehicleId,
        registry: &FleetRegistry,
        resources: &mut MapResources<S>,
        now: Instant,
    ) -> Result<bool> {
        let entry = match registry.entry(id) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("selection ignored: {err}");
                return Ok(false);
            }
        };
        let Some(target) = entry.position() else {
            log::debug!("vehicle {id} has no position yet, selection ignored");
            return Ok(false);
        };

        let command = self
            .sequencer
            .start(id, target, &resources.viewport(), now)?;

        resources.close_popup();
        self.clear_selection();
        self.apply(command, registry, resources);
        Ok(true)
    }

    pub fn handle_surface_event<S: MapSurface>(
        &mut self,
        event: SurfaceEvent,
        registry: &FleetRegistry,
        resources: &mut MapResources<S>,
    ) -> Result<()> {
        self.handle_surface_event_at(event, registry, resources, Instant::now())
    }

    pub fn handle_surface_event_at<S: MapSurface>(
        &mut self,
        event: SurfaceEvent,
        registry: &FleetRegistry,
        resources: &mut MapResources<S>,
        now: Instant,
    ) -> Result<()> {
        match event {
            SurfaceEvent::TransitionComplete(tag) => {
                if let Some(command) = self.sequencer.on_transition_complete(tag, now) {
                    self.apply(command, registry, resources);
                }
            }
            SurfaceEvent::MarkerClicked(id) => {
                self.select_vehicle_at(id, registry, resources, now)?;
            }
            SurfaceEvent::Popup(action) => self.popup_action(action, resources),
        }
        Ok(())
    }

    pub fn tick<S: MapSurface>(&mut self, registry: &FleetRegistry, resources: &mut MapResources<S>) {
        self.tick_at(registry, resources, Instant::now());
    }

    /// Per-frame housekeeping: force along any step that overran its deadline
    pub fn tick_at<S: MapSurface>(
        &mut self,
        registry: &FleetRegistry,
        resources: &mut MapResources<S>,
        now: Instant,
    ) {
        if let Some(command) = self.sequencer.check_timeout(now) {
            self.apply(command, registry, resources);
        }
    }

    /// Apply fresh fleet data to the map. A selection whose vehicle lost its
    /// position is cleared.
    pub fn refresh<S: MapSurface>(&mut self, registry: &FleetRegistry, resources: &mut MapResources<S>) {
        resources.sync_markers(registry);
        if self.active_vehicle.is_some() && resources.popup().is_none() {
            self.clear_selection();
        }
    }

    pub fn popup_action<S: MapSurface>(&mut self, action: PopupAction, resources: &mut MapResources<S>) {
        match action {
            PopupAction::Close => self.close_popup(resources),
            PopupAction::OpenDetail(id) => self.events.push_back(CameraEvent::DetailRequested(id)),
        }
    }

    pub fn close_popup<S: MapSurface>(&mut self, resources: &mut MapResources<S>) {
        resources.close_popup();
        self.clear_selection();
    }

    /// Stop the running sequence where it is
    pub fn cancel(&mut self) {
        self.sequencer.cancel();
    }

    pub fn drain_events(&mut self) -> Vec<CameraEvent> {
        self.events.drain(..).collect()
    }

    fn apply<S: MapSurface>(
        &mut self,
        command: CameraCommand,
        registry: &FleetRegistry,
        resources: &mut MapResources<S>,
    ) {
        match command {
            CameraCommand::Animate { tag, request } => {
                resources.surface_mut().ease_to(tag, request);
            }
            CameraCommand::Jump {
                vehicle,
                center,
                zoom,
            } => {
                resources.surface_mut().jump_to(center, zoom);
                self.settle(vehicle, center, registry, resources);
            }
            CameraCommand::Settled { vehicle, position } => {
                self.settle(vehicle, position, registry, resources);
            }
        }
    }

    fn settle<S: MapSurface>(
        &mut self,
        vehicle: VehicleId,
        position: LatLng,
        registry: &FleetRegistry,
        resources: &mut MapResources<S>,
    ) {
        log::info!("camera settled on vehicle {vehicle}");
        match registry.get(vehicle) {
            Some(entry) => resources.show_popup(VehiclePopup::for_entry(entry, position)),
            None => log::warn!("vehicle {vehicle} left the fleet during the flight, no popup"),
        }
        self.active_vehicle = Some(vehicle);
        self.events.push_back(CameraEvent::Settled {
            vehicle_id: vehicle,
            position,
        });
    }

    fn clear_selection(&mut self) {
        if self.active_vehicle.take().is_some() {
            self.events.push_back(CameraEvent::SelectionCleared);
        }
    }
}

impl Default for CameraAnimator {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
