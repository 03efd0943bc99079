//! Map-side resources: the live surface, its markers and the info popup
//!
//! [`MapResources`] owns everything the camera draws on a map, so the
//! animator never reaches for shared mutable handles. [`HeadlessMap`] is an
//! in-process [`MapSurface`] used by the demo binary and the tests.

use crate::{
    animation::transitions::{Transition, TransitionRequest, TransitionTag},
    core::{geo::LatLng, viewport::Viewport},
    fleet::{model::VehicleId, registry::FleetRegistry},
    layers::marker::VehicleMarker,
    prelude::{Duration, HashMap, HashSet},
    traits::{MapSurface, SurfaceEvent},
    ui::popup::{PopupAction, VehiclePopup},
};

/// One live map plus the markers and popup placed on it
#[derive(Debug)]
pub struct MapResources<S: MapSurface> {
    surface: S,
    markers: HashMap<VehicleId, VehicleMarker>,
    popup: Option<VehiclePopup>,
}

impl<S: MapSurface> MapResources<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            markers: HashMap::default(),
            popup: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    pub fn markers(&self) -> &HashMap<VehicleId, VehicleMarker> {
        &self.markers
    }

    pub fn marker(&self, id: VehicleId) -> Option<&VehicleMarker> {
        self.markers.get(&id)
    }

    pub fn popup(&self) -> Option<&VehiclePopup> {
        self.popup.as_ref()
    }

    /// Bring the marker set in line with the registry.
    ///
    /// Vehicles without a usable position lose their marker. An open popup
    /// follows its vehicle, or closes when the vehicle is no longer mappable.
    pub fn sync_markers(&mut self, registry: &FleetRegistry) {
        let mut seen = HashSet::default();

        for (entry, position) in registry.mappable() {
            let marker = VehicleMarker::for_entry(entry, position);
            seen.insert(marker.vehicle_id());
            if self.markers.get(&marker.vehicle_id()) != Some(&marker) {
                self.surface.add_marker(&marker);
                self.markers.insert(marker.vehicle_id(), marker);
            }
        }

        let stale: Vec<VehicleId> = self
            .markers
            .keys()
            .filter(|id| !seen.contains(*id))
            .copied()
            .collect();
        for id in stale {
            self.surface.remove_marker(id);
            self.markers.remove(&id);
        }

        if let Some(vehicle_id) = self.popup.as_ref().map(|popup| popup.vehicle_id) {
            let refreshed = registry.get(vehicle_id).and_then(|entry| {
                entry
                    .position()
                    .map(|position| VehiclePopup::for_entry(entry, position))
            });
            match refreshed {
                Some(refreshed) if Some(&refreshed) != self.popup.as_ref() => {
                    self.show_popup(refreshed)
                }
                Some(_) => {}
                None => {
                    self.close_popup();
                }
            }
        }
    }

    /// Open `popup`, replacing the current one
    pub fn show_popup(&mut self, popup: VehiclePopup) {
        self.surface.show_popup(&popup);
        self.popup = Some(popup);
    }

    /// Returns the popup that was open, if any
    pub fn close_popup(&mut self) -> Option<VehiclePopup> {
        let popup = self.popup.take();
        if popup.is_some() {
            self.surface.remove_popup();
        }
        popup
    }

    /// Remove every marker and the popup from the surface
    pub fn dispose(&mut self) {
        self.close_popup();
        for id in self.markers.keys() {
            self.surface.remove_marker(*id);
        }
        self.markers.clear();
    }

    /// Tear down and hand back the bare surface
    pub fn into_surface(mut self) -> S {
        self.dispose();
        self.surface
    }
}

/// A map surface with no display, animated by explicit frame deltas
#[derive(Debug)]
pub struct HeadlessMap {
    viewport: Viewport,
    transition: Option<Transition>,
    markers: HashMap<VehicleId, VehicleMarker>,
    popup: Option<VehiclePopup>,
    events: Vec<SurfaceEvent>,
    interrupt_events: bool,
    stalled: bool,
}

impl HeadlessMap {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            transition: None,
            markers: HashMap::default(),
            popup: None,
            events: Vec::new(),
            interrupt_events: true,
            stalled: false,
        }
    }

    /// Whether replacing a running transition reports it as complete
    pub fn with_interrupt_events(mut self, enabled: bool) -> Self {
        self.interrupt_events = enabled;
        self
    }

    /// Stop reporting completions, as a map that lost its event listener would
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    /// Step the running transition and return the events raised since the
    /// last call
    pub fn advance(&mut self, delta: Duration) -> Vec<SurfaceEvent> {
        if let Some(transition) = self.transition.as_mut() {
            let completed = transition.update(delta);
            self.viewport = transition.current_viewport;
            if completed {
                let tag = transition.tag;
                self.transition = None;
                self.report_complete(tag);
            }
        }
        std::mem::take(&mut self.events)
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn current_transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Simulate a click on a vehicle pin; clicks beside any marker are lost
    pub fn click_marker(&mut self, id: VehicleId) -> bool {
        if !self.markers.contains_key(&id) {
            return false;
        }
        self.events.push(SurfaceEvent::MarkerClicked(id));
        true
    }

    /// Simulate a popup button press
    pub fn press_popup(&mut self, action: PopupAction) -> bool {
        if self.popup.is_none() {
            return false;
        }
        self.events.push(SurfaceEvent::Popup(action));
        true
    }

    pub fn markers(&self) -> &HashMap<VehicleId, VehicleMarker> {
        &self.markers
    }

    pub fn popup(&self) -> Option<&VehiclePopup> {
        self.popup.as_ref()
    }

    fn report_complete(&mut self, tag: TransitionTag) {
        if self.stalled {
            log::trace!("stalled surface swallowed completion of {}", tag.request);
            return;
        }
        self.events.push(SurfaceEvent::TransitionComplete(tag));
    }
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl MapSurface for HeadlessMap {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn ease_to(&mut self, tag: TransitionTag, request: TransitionRequest) {
        if let Some(mut previous) = self.transition.take() {
            previous.cancel();
            if self.interrupt_events {
                self.report_complete(previous.tag);
            }
        }
        self.transition = Some(Transition::start(tag, request, self.viewport));
    }

    fn jump_to(&mut self, center: LatLng, zoom: f64) {
        self.transition = None;
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
    }

    fn add_marker(&mut self, marker: &VehicleMarker) {
        self.markers.insert(marker.vehicle_id(), marker.clone());
    }

    fn remove_marker(&mut self, vehicle_id: VehicleId) {
        self.markers.remove(&vehicle_id);
    }

    fn show_popup(&mut self, popup: &VehiclePopup) {
        self.popup = Some(popup.clone());
    }

    fn remove_popup(&mut self) {
        self.popup = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::transitions::{RequestId, TransitionStep};
    use crate::fleet::model::{VehicleDetail, VehicleStatus, VehicleSummary};

    fn registry_with(vehicles: &[(u64, Option<(f64, f64)>)]) -> FleetRegistry {
        let mut registry = FleetRegistry::new();
        registry.apply_vehicle_list(
            vehicles
                .iter()
                .map(|(id, _)| VehicleSummary {
                    id: VehicleId(*id),
                    name: format!("Vehicle {id}"),
                    status: VehicleStatus::Active,
                    speed: 10.0,
                    updated_at: String::new(),
                })
                .collect(),
        );
        for (id, position) in vehicles {
            if let Some((lat, lng)) = position {
                registry.apply_detail(VehicleDetail {
                    vehicle_id: VehicleId(*id),
                    latitude: *lat,
                    longitude: *lng,
                    speed: 10.0,
                    fuel_level: 50.0,
                    odometer: 0.0,
                    timestamp: String::new(),
                });
            }
        }
        registry
    }

    fn tag(request: u64, step: TransitionStep) -> TransitionTag {
        TransitionTag::new(RequestId(request), step)
    }

    #[test]
    fn test_sync_markers_tracks_registry() {
        let mut resources = MapResources::new(HeadlessMap::default());
        let registry = registry_with(&[(1, Some((-6.2, 106.8))), (2, None)]);
        resources.sync_markers(&registry);

        assert_eq!(resources.markers().len(), 1);
        assert!(resources.surface().markers().contains_key(&VehicleId(1)));

        let registry = registry_with(&[(2, Some((-7.25, 112.75)))]);
        resources.sync_markers(&registry);
        assert!(resources.marker(VehicleId(1)).is_none());
        assert!(!resources.surface().markers().contains_key(&VehicleId(1)));
        assert_eq!(
            resources.marker(VehicleId(2)).map(VehicleMarker::position),
            Some(LatLng::new(-7.25, 112.75))
        );
    }

    #[test]
    fn test_popup_closes_when_vehicle_disappears() {
        let mut resources = MapResources::new(HeadlessMap::default());
        let registry = registry_with(&[(1, Some((-6.2, 106.8)))]);
        resources.sync_markers(&registry);
        resources.show_popup(VehiclePopup::new(VehicleId(1), LatLng::new(-6.2, 106.8), "Vehicle 1"));
        assert!(resources.surface().popup().is_some());

        resources.sync_markers(&registry_with(&[(3, None)]));
        assert!(resources.popup().is_none());
        assert!(resources.surface().popup().is_none());
    }

    #[test]
    fn test_dispose_clears_surface() {
        let mut resources = MapResources::new(HeadlessMap::default());
        resources.sync_markers(&registry_with(&[(1, Some((-6.2, 106.8)))]));
        resources.show_popup(VehiclePopup::new(VehicleId(1), LatLng::new(-6.2, 106.8), "Vehicle 1"));

        let surface = resources.into_surface();
        assert!(surface.markers().is_empty());
        assert!(surface.popup().is_none());
    }

    #[test]
    fn test_headless_transition_reports_completion() {
        let mut map = HeadlessMap::new(Viewport::new(LatLng::new(0.0, 100.0), 8.0));
        let request = TransitionRequest::new(LatLng::new(1.0, 101.0), 10.0, Duration::from_millis(100));
        map.ease_to(tag(1, TransitionStep::Pan), request);

        assert!(map.advance(Duration::from_millis(50)).is_empty());
        assert!(map.is_animating());

        let events = map.advance(Duration::from_millis(50));
        assert_eq!(events, vec![SurfaceEvent::TransitionComplete(tag(1, TransitionStep::Pan))]);
        assert_eq!(map.viewport().center, LatLng::new(1.0, 101.0));
        assert_eq!(map.viewport().zoom, 10.0);
    }

    #[test]
    fn test_interrupted_transition_reports_old_tag() {
        let mut map = HeadlessMap::default();
        let request = TransitionRequest::new(LatLng::new(1.0, 101.0), 10.0, Duration::from_millis(100));
        map.ease_to(tag(1, TransitionStep::ZoomOut), request);
        map.ease_to(tag(2, TransitionStep::ZoomOut), request);

        let events = map.advance(Duration::ZERO);
        assert_eq!(
            events,
            vec![SurfaceEvent::TransitionComplete(tag(1, TransitionStep::ZoomOut))]
        );

        let mut quiet = HeadlessMap::default().with_interrupt_events(false);
        quiet.ease_to(tag(1, TransitionStep::ZoomOut), request);
        quiet.ease_to(tag(2, TransitionStep::ZoomOut), request);
        assert!(quiet.advance(Duration::ZERO).is_empty());
    }

    #[test]
    fn test_stalled_map_swallows_completion() {
        let mut map = HeadlessMap::default();
        map.set_stalled(true);
        let request = TransitionRequest::new(LatLng::new(1.0, 101.0), 10.0, Duration::from_millis(10));
        map.ease_to(tag(1, TransitionStep::Pan), request);
        assert!(map.advance(Duration::from_millis(20)).is_empty());
        assert!(!map.is_animating());
    }

    #[test]
    fn test_clicks_need_a_target() {
        let mut map = HeadlessMap::default();
        assert!(!map.click_marker(VehicleId(1)));
        assert!(!map.press_popup(PopupAction::Close));

        map.add_marker(&VehicleMarker::new(
            VehicleId(1),
            LatLng::new(-6.2, 106.8),
            crate::layers::marker::MarkerStyle::Moving,
        ));
        assert!(map.click_marker(VehicleId(1)));
        assert_eq!(map.advance(Duration::ZERO), vec![SurfaceEvent::MarkerClicked(VehicleId(1))]);
    }
}
