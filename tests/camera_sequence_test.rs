use fleetmap::prelude::*;
use fleetmap::{PopupAction, SequenceState, TransitionStep, VehicleStatus};

const FRAME: Duration = Duration::from_millis(16);

fn jakarta() -> LatLng {
    LatLng::new(-6.2, 106.8)
}

/// Registry with the given vehicles, all reporting positions
fn fleet(vehicles: &[(u64, &str, f64, f64)]) -> FleetRegistry {
    let mut registry = FleetRegistry::new();
    registry.apply_vehicle_list(
        vehicles
            .iter()
            .map(|(id, name, _, _)| VehicleSummary {
                id: VehicleId(*id),
                name: name.to_string(),
                status: VehicleStatus::Active,
                speed: 40.0,
                updated_at: "2025-01-15T08:30:00Z".to_string(),
            })
            .collect(),
    );
    for (id, _, lat, lng) in vehicles {
        registry.apply_detail(VehicleDetail {
            vehicle_id: VehicleId(*id),
            latitude: *lat,
            longitude: *lng,
            speed: 40.0,
            fuel_level: 50.0,
            odometer: 1000.0,
            timestamp: "2025-01-15T08:30:00Z".to_string(),
        });
    }
    registry
}

fn map_at(center: LatLng, zoom: f64) -> MapResources<HeadlessMap> {
    MapResources::new(HeadlessMap::new(Viewport::new(center, zoom)))
}

/// Advance one frame and feed every surface event back into the animator
fn step(
    animator: &mut CameraAnimator,
    registry: &FleetRegistry,
    resources: &mut MapResources<HeadlessMap>,
) {
    for event in resources.surface_mut().advance(FRAME) {
        animator
            .handle_surface_event(event, registry, resources)
            .unwrap();
    }
    animator.tick(registry, resources);
}

fn run_until_idle(
    animator: &mut CameraAnimator,
    registry: &FleetRegistry,
    resources: &mut MapResources<HeadlessMap>,
) {
    for _ in 0..500 {
        if !animator.is_animating() {
            return;
        }
        step(animator, registry, resources);
    }
    panic!("camera never settled");
}

fn settled_events(events: &[CameraEvent]) -> Vec<VehicleId> {
    events
        .iter()
        .filter_map(|event| match event {
            CameraEvent::Settled { vehicle_id, .. } => Some(*vehicle_id),
            _ => None,
        })
        .collect()
}

#[test]
fn test_fifty_km_hop_runs_three_steps() {
    // ~50 km east of Jakarta
    let target = LatLng::new(-6.2, 107.25);
    let registry = fleet(&[(1, "Avanza G-123", target.lat, target.lng)]);
    let mut resources = map_at(jakarta(), 8.0);
    let mut animator = CameraAnimator::default();

    assert!(animator
        .select_vehicle(VehicleId(1), &registry, &mut resources)
        .unwrap());

    let mut observed = Vec::new();
    for _ in 0..500 {
        if let Some(transition) = resources.surface().current_transition() {
            let entry = (
                transition.tag.step,
                transition.request.duration,
                transition.request.target_center,
                transition.request.target_zoom,
            );
            if observed.last() != Some(&entry) {
                observed.push(entry);
            }
        }
        if !animator.is_animating() {
            break;
        }
        step(&mut animator, &registry, &mut resources);
    }

    assert_eq!(observed.len(), 3);

    let (zoom_out_step, zoom_out_duration, zoom_out_center, zoom_out) = observed[0];
    assert_eq!(zoom_out_step, TransitionStep::ZoomOut);
    assert_eq!(zoom_out_duration, Duration::from_millis(400));
    assert_eq!(zoom_out_center, jakarta());
    assert!(zoom_out >= 4.0 && zoom_out < 8.0, "zoom out level {zoom_out}");

    let (pan_step, pan_duration, pan_center, pan_zoom) = observed[1];
    assert_eq!(pan_step, TransitionStep::Pan);
    assert_eq!(pan_duration, Duration::from_millis(600));
    assert_eq!(pan_center, target);
    assert_eq!(pan_zoom, zoom_out);

    let (zoom_in_step, zoom_in_duration, zoom_in_center, zoom_in) = observed[2];
    assert_eq!(zoom_in_step, TransitionStep::ZoomIn);
    assert_eq!(zoom_in_duration, Duration::from_millis(600));
    assert_eq!(zoom_in_center, target);
    assert_eq!(zoom_in, 12.0);

    assert_eq!(resources.viewport().center, target);
    assert_eq!(resources.viewport().zoom, 12.0);
    assert_eq!(
        animator.drain_events(),
        vec![CameraEvent::Settled {
            vehicle_id: VehicleId(1),
            position: target,
        }]
    );
}

#[test]
fn test_far_hop_zooms_out_to_minimum() {
    // Jakarta to Jayapura is well beyond the 2,700 km reference distance
    let registry = fleet(&[(1, "Terios R", -2.5337, 140.7181)]);
    let mut resources = map_at(jakarta(), 10.0);
    let mut animator = CameraAnimator::default();

    animator
        .select_vehicle(VehicleId(1), &registry, &mut resources)
        .unwrap();
    match animator.sequencer().state() {
        SequenceState::ZoomingOut(active) => assert_eq!(active.zoom_out, 4.0),
        other => panic!("expected ZoomingOut, got {other:?}"),
    }
}

#[test]
fn test_superseded_selection_settles_only_on_latest() {
    let registry = fleet(&[
        (1, "Avanza G-123", -6.2, 107.25),
        (2, "Ertiga Hybrid", -7.2575, 112.7521),
    ]);
    let mut resources = map_at(jakarta(), 8.0);
    let mut animator = CameraAnimator::default();

    animator
        .select_vehicle(VehicleId(1), &registry, &mut resources)
        .unwrap();
    for _ in 0..10 {
        step(&mut animator, &registry, &mut resources);
    }

    // The map reports the interrupted zoom-out as complete; that event must
    // not advance the new sequence
    animator
        .select_vehicle(VehicleId(2), &registry, &mut resources)
        .unwrap();
    step(&mut animator, &registry, &mut resources);
    assert!(matches!(
        animator.sequencer().state(),
        SequenceState::ZoomingOut(active) if active.vehicle == VehicleId(2)
    ));

    run_until_idle(&mut animator, &registry, &mut resources);

    assert_eq!(settled_events(&animator.drain_events()), vec![VehicleId(2)]);
    assert_eq!(animator.active_vehicle(), Some(VehicleId(2)));
    assert_eq!(resources.viewport().center, LatLng::new(-7.2575, 112.7521));
    assert_eq!(
        resources.popup().map(|popup| popup.vehicle_id),
        Some(VehicleId(2))
    );
}

#[test]
fn test_selection_during_pan_supersedes() {
    let registry = fleet(&[
        (1, "Avanza G-123", -6.2, 107.25),
        (2, "Brio Satya", -6.9175, 107.6191),
    ]);
    let mut resources = map_at(jakarta(), 8.0);
    let mut animator = CameraAnimator::default();

    animator
        .select_vehicle(VehicleId(1), &registry, &mut resources)
        .unwrap();
    while !matches!(animator.sequencer().state(), SequenceState::Panning(_)) {
        step(&mut animator, &registry, &mut resources);
    }
    step(&mut animator, &registry, &mut resources);

    animator
        .select_vehicle(VehicleId(2), &registry, &mut resources)
        .unwrap();
    run_until_idle(&mut animator, &registry, &mut resources);

    assert_eq!(settled_events(&animator.drain_events()), vec![VehicleId(2)]);
    assert_eq!(resources.viewport().center, LatLng::new(-6.9175, 107.6191));
}

#[test]
fn test_stalled_map_settles_through_timeouts() {
    let registry = fleet(&[(1, "Avanza G-123", -6.2, 107.25)]);
    let mut resources = map_at(jakarta(), 8.0);
    resources.surface_mut().set_stalled(true);
    let mut animator = CameraAnimator::default();

    let start = Instant::now();
    animator
        .select_vehicle_at(VehicleId(1), &registry, &mut resources, start)
        .unwrap();

    // Each step gets its duration plus one second of grace
    let zoom_out_deadline = start + Duration::from_millis(1400);
    animator.tick_at(&registry, &mut resources, zoom_out_deadline - Duration::from_millis(1));
    assert!(matches!(animator.sequencer().state(), SequenceState::ZoomingOut(_)));

    animator.tick_at(&registry, &mut resources, zoom_out_deadline);
    assert!(matches!(animator.sequencer().state(), SequenceState::Panning(_)));

    let pan_deadline = zoom_out_deadline + Duration::from_millis(1600);
    animator.tick_at(&registry, &mut resources, pan_deadline);
    assert!(matches!(animator.sequencer().state(), SequenceState::ZoomingIn(_)));

    let zoom_in_deadline = pan_deadline + Duration::from_millis(1600);
    animator.tick_at(&registry, &mut resources, zoom_in_deadline);

    assert!(!animator.is_animating());
    assert_eq!(settled_events(&animator.drain_events()), vec![VehicleId(1)]);
    assert!(resources.popup().is_some());
}

#[test]
fn test_invalid_viewport_jumps_straight_to_vehicle() {
    let registry = fleet(&[(4, "Ertiga Hybrid", -7.2575, 112.7521)]);
    let mut resources = map_at(LatLng::new(f64::NAN, f64::NAN), 8.0);
    let mut animator = CameraAnimator::default();

    assert!(animator
        .select_vehicle(VehicleId(4), &registry, &mut resources)
        .unwrap());

    assert!(!animator.is_animating());
    assert!(!resources.surface().is_animating());
    assert_eq!(resources.viewport().center, LatLng::new(-7.2575, 112.7521));
    assert_eq!(resources.viewport().zoom, 12.0);
    assert_eq!(settled_events(&animator.drain_events()), vec![VehicleId(4)]);
}

#[test]
fn test_reduced_profile_jumps() {
    let config = FleetMapConfig::from_json_str(r#"{"profile": "reduced"}"#).unwrap();
    let registry = fleet(&[(1, "Avanza G-123", -6.2, 107.25)]);
    let mut resources = map_at(jakarta(), 13.0);
    let mut animator = CameraAnimator::new(config.camera());

    animator
        .select_vehicle(VehicleId(1), &registry, &mut resources)
        .unwrap();

    assert_eq!(resources.viewport().center, LatLng::new(-6.2, 107.25));
    // Already closer than the settle zoom: keep it
    assert_eq!(resources.viewport().zoom, 13.0);
    assert_eq!(settled_events(&animator.drain_events()), vec![VehicleId(1)]);
}

#[test]
fn test_marker_click_selects_vehicle() {
    let registry = fleet(&[(1, "Avanza G-123", -6.2, 107.25)]);
    let mut resources = map_at(jakarta(), 8.0);
    let mut animator = CameraAnimator::default();
    animator.refresh(&registry, &mut resources);

    assert!(resources.surface_mut().click_marker(VehicleId(1)));
    step(&mut animator, &registry, &mut resources);
    assert!(animator.is_animating());

    run_until_idle(&mut animator, &registry, &mut resources);
    assert_eq!(animator.active_vehicle(), Some(VehicleId(1)));

    assert!(resources.surface_mut().press_popup(PopupAction::Close));
    step(&mut animator, &registry, &mut resources);
    assert!(resources.popup().is_none());
    assert_eq!(animator.active_vehicle(), None);
}
