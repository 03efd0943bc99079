use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use fleetmap::{
    constants::DEFAULT_EXTENT, fleet::apply_pending, CameraAnimator, CameraEvent, FleetMapConfig,
    FleetPoller, FleetRegistry, FleetSource, HeadlessMap, LatLngBounds, MapError, MapResources,
    MapSurface, VehicleDetail, VehicleId, VehicleStatus, VehicleSummary, Viewport,
};

const FRAME: Duration = Duration::from_millis(16);

/// Frames allowed for one flight before the demo gives up
const MAX_FRAMES_PER_FLIGHT: usize = 400;

/// Headless fleet map demo: polls a canned fleet and flies the camera
/// between vehicles, logging every step.
///
/// Usage: `fleetmap-app [config.json]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            FleetMapConfig::from_json_str(&json).with_context(|| format!("parsing config {path}"))?
        }
        None => FleetMapConfig::default(),
    };

    let (mut poller, updates) = FleetPoller::new(Arc::new(DemoFleet), config.polling.clone());
    poller.poll_once().await?;
    let poller_handle = poller.spawn();

    let mut registry = FleetRegistry::new();
    let mut resources = MapResources::new(HeadlessMap::new(Viewport::default()));
    let mut animator = CameraAnimator::new(config.camera());

    apply_pending(&updates, &mut registry);
    animator.refresh(&registry, &mut resources);

    let stats = registry.stats();
    log::info!(
        "fleet: {} vehicles, {} active, {} parked, {} in maintenance, {} on the map",
        stats.total,
        stats.active,
        stats.parked,
        stats.maintenance,
        resources.markers().len()
    );

    let service_area = LatLngBounds::from_extent(DEFAULT_EXTENT);
    for (entry, position) in registry.mappable() {
        if !service_area.contains(&position) {
            log::warn!("{} is outside the service area", entry.summary.name);
        }
    }

    let tour: Vec<VehicleId> = registry.mappable().map(|(entry, _)| entry.id()).collect();
    if tour.is_empty() {
        bail!("no vehicle has a position to fly to");
    }

    let mut ticker = tokio::time::interval(FRAME);
    for id in tour {
        if !animator.select_vehicle(id, &registry, &mut resources)? {
            continue;
        }

        let mut frames = 0;
        while animator.is_animating() && frames < MAX_FRAMES_PER_FLIGHT {
            ticker.tick().await;
            frames += 1;

            for event in resources.surface_mut().advance(FRAME) {
                animator.handle_surface_event(event, &registry, &mut resources)?;
            }
            animator.tick(&registry, &mut resources);

            if apply_pending(&updates, &mut registry) {
                animator.refresh(&registry, &mut resources);
            }
        }

        for event in animator.drain_events() {
            if let CameraEvent::Settled { vehicle_id, position } = event {
                let viewport = resources.viewport();
                log::info!(
                    "settled on {vehicle_id} at ({:.4}, {:.4}), zoom {:.1} after {frames} frames",
                    position.lat,
                    position.lng,
                    viewport.zoom
                );
                if let Some(popup) = resources.popup() {
                    for line in popup.content_lines() {
                        log::info!("  {line}");
                    }
                }
            }
        }
    }

    animator.close_popup(&mut resources);
    poller_handle.cancel();
    let map = resources.into_surface();
    log::info!("demo finished with the camera at zoom {:.1}", map.viewport().zoom);
    Ok(())
}

/// Canned fleet spread across Indonesia
struct DemoFleet;

const VEHICLES: [(u64, &str, &str, f64, Option<(f64, f64)>); 6] = [
    (1, "Avanza G-123", "ACTIVE", 60.0, Some((-6.2088, 106.8456))),
    (2, "Brio Satya", "ACTIVE", 0.0, Some((-6.9175, 107.6191))),
    (3, "Pajero Sport", "INACTIVE", 0.0, Some((-7.7956, 110.3695))),
    (4, "Ertiga Hybrid", "ACTIVE", 45.0, Some((-7.2575, 112.7521))),
    (5, "AirEV Long Range", "MAINTENANCE", 0.0, None),
    (6, "Terios R", "ACTIVE", 75.0, Some((3.5952, 98.6722))),
];

#[async_trait]
impl FleetSource for DemoFleet {
    async fn fetch_vehicles(&self) -> fleetmap::Result<Vec<VehicleSummary>> {
        Ok(VEHICLES
            .iter()
            .map(|(id, name, status, speed, _)| VehicleSummary {
                id: VehicleId(*id),
                name: name.to_string(),
                status: VehicleStatus::from(status.to_string()),
                speed: *speed,
                updated_at: "2025-01-15T08:30:00Z".to_string(),
            })
            .collect())
    }

    async fn fetch_detail(&self, id: VehicleId) -> fleetmap::Result<VehicleDetail> {
        let (_, _, _, speed, position) = VEHICLES
            .iter()
            .find(|vehicle| vehicle.0 == id.0)
            .ok_or(MapError::UnknownVehicle(id))?;
        let (latitude, longitude) =
            position.ok_or_else(|| MapError::Source("Failed to fetch vehicle detail.".to_string()))?;

        Ok(VehicleDetail {
            vehicle_id: id,
            latitude,
            longitude,
            speed: *speed,
            fuel_level: 64.0,
            odometer: 18_250.0,
            timestamp: "2025-01-15T08:30:00Z".to_string(),
        })
    }
}

