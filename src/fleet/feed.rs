//! Background polling of the fleet API
//!
//! [`FleetPoller`] fetches the vehicle list and per-vehicle details on fixed
//! intervals and ships the results as [`FleetUpdate`]s over a crossbeam
//! channel. The UI side drains the channel each frame and applies the
//! updates to its [`FleetRegistry`]. Failed fetches are reported, never
//! retried early; the next tick tries again.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use futures::future::join_all;

use crate::{
    core::config::PollingConfig,
    fleet::{
        model::{VehicleDetail, VehicleId, VehicleSummary},
        registry::FleetRegistry,
    },
    prelude::{Duration, HashSet, Instant},
    runtime::{self, async_delay, AsyncHandle},
    traits::FleetSource,
    MapError, Result,
};

/// Message from the poller to the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum FleetUpdate {
    Vehicles(Vec<VehicleSummary>),
    /// The list fetch failed; the previous list stays in place
    VehiclesFailed(String),
    Detail(VehicleDetail),
    DetailFailed { id: VehicleId, reason: String },
}

impl FleetUpdate {
    /// Merge into the registry. Returns true when the registry changed.
    pub fn apply(self, registry: &mut FleetRegistry) -> bool {
        match self {
            Self::Vehicles(vehicles) => {
                registry.apply_vehicle_list(vehicles);
                true
            }
            Self::VehiclesFailed(reason) => {
                log::warn!("vehicle list unavailable: {reason}");
                false
            }
            Self::Detail(detail) => registry.apply_detail(detail),
            Self::DetailFailed { id, reason } => registry.mark_unavailable(id, reason),
        }
    }
}

/// Drain every pending update into `registry`. Returns true when anything changed.
pub fn apply_pending(updates: &Receiver<FleetUpdate>, registry: &mut FleetRegistry) -> bool {
    let mut changed = false;
    for update in updates.try_iter() {
        changed |= update.apply(registry);
    }
    changed
}

pub struct FleetPoller<F: FleetSource + 'static> {
    source: Arc<F>,
    config: PollingConfig,
    updates: Sender<FleetUpdate>,
    /// Ids from the last successful list fetch
    known: Vec<VehicleId>,
}

impl<F: FleetSource + 'static> FleetPoller<F> {
    pub fn new(source: Arc<F>, config: PollingConfig) -> (Self, Receiver<FleetUpdate>) {
        let (updates, receiver) = unbounded();
        let poller = Self {
            source,
            config,
            updates,
            known: Vec::new(),
        };
        (poller, receiver)
    }

    pub fn known_vehicles(&self) -> &[VehicleId] {
        &self.known
    }

    /// Fetch the list, then the details of vehicles not seen before
    pub async fn poll_vehicles(&mut self) -> Result<()> {
        match self.source.fetch_vehicles().await {
            Ok(vehicles) => {
                let known: HashSet<VehicleId> = self.known.iter().copied().collect();
                let ids: Vec<VehicleId> = vehicles.iter().map(|vehicle| vehicle.id).collect();
                let new_ids: Vec<VehicleId> = ids
                    .iter()
                    .filter(|id| !known.contains(*id))
                    .copied()
                    .collect();
                log::debug!("fetched {} vehicles, {} new", ids.len(), new_ids.len());

                self.known = ids;
                self.send(FleetUpdate::Vehicles(vehicles))?;
                self.fetch_details(&new_ids).await
            }
            Err(err) => {
                log::warn!("vehicle list fetch failed: {err}");
                self.send(FleetUpdate::VehiclesFailed(err.to_string()))
            }
        }
    }

    /// Refresh the details of every known vehicle
    pub async fn poll_details(&self) -> Result<()> {
        self.fetch_details(&self.known).await
    }

    /// One list poll, including first details for new vehicles
    pub async fn poll_once(&mut self) -> Result<()> {
        self.poll_vehicles().await
    }

    /// Poll forever on the configured intervals.
    ///
    /// Ends with [`MapError::ChannelClosed`] once the receiving side is gone.
    pub async fn run(mut self) -> Result<()> {
        let list_every = self.config.vehicle_list_interval();
        let detail_every = self.config.vehicle_detail_interval();
        let mut next_list = Instant::now();
        let mut next_detail = next_list + detail_every;

        loop {
            let now = Instant::now();
            if now >= next_list {
                self.poll_vehicles().await?;
                next_list = now + list_every;
            }
            if now >= next_detail {
                self.poll_details().await?;
                next_detail = now + detail_every;
            }

            let wake = next_list.min(next_detail);
            let now = Instant::now();
            let wait = if wake > now { wake - now } else { Duration::ZERO };
            async_delay(wait).await;
        }
    }

    /// Run the polling loop on the crate runtime
    pub fn spawn(self) -> Box<dyn AsyncHandle> {
        runtime::spawn(async move {
            match self.run().await {
                Err(MapError::ChannelClosed) => log::debug!("fleet poller stopped: receiver dropped"),
                Err(err) => log::error!("fleet poller stopped: {err}"),
                Ok(()) => {}
            }
        })
    }

    async fn fetch_details(&self, ids: &[VehicleId]) -> Result<()> {
        let fetches = ids.iter().map(|&id| {
            let source = Arc::clone(&self.source);
            async move { (id, source.fetch_detail(id).await) }
        });

        for (id, result) in join_all(fetches).await {
            let update = match result {
                Ok(detail) => FleetUpdate::Detail(detail),
                Err(err) => FleetUpdate::DetailFailed {
                    id,
                    reason: err.to_string(),
                },
            };
            self.send(update)?;
        }
        Ok(())
    }

    fn send(&self, update: FleetUpdate) -> Result<()> {
        self.updates
            .send(update)
            .map_err(|_| MapError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::model::VehicleStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubSource {
        vehicles: Mutex<Vec<VehicleSummary>>,
        list_fails: Mutex<bool>,
        details_fail: Mutex<bool>,
    }

    impl StubSource {
        fn with_vehicles(ids: &[u64]) -> Self {
            let source = Self::default();
            source.set_vehicles(ids);
            source
        }

        fn set_vehicles(&self, ids: &[u64]) {
            *self.vehicles.lock().unwrap() = ids
                .iter()
                .map(|&id| VehicleSummary {
                    id: VehicleId(id),
                    name: format!("Vehicle {id}"),
                    status: VehicleStatus::Active,
                    speed: 20.0,
                    updated_at: String::new(),
                })
                .collect();
        }
    }

    #[async_trait]
    impl FleetSource for StubSource {
        async fn fetch_vehicles(&self) -> Result<Vec<VehicleSummary>> {
            if *self.list_fails.lock().unwrap() {
                return Err(MapError::Source("Failed to fetch vehicles.".to_string()));
            }
            Ok(self.vehicles.lock().unwrap().clone())
        }

        // Odd ids have no telemetry
        async fn fetch_detail(&self, id: VehicleId) -> Result<VehicleDetail> {
            if id.0 % 2 == 1 || *self.details_fail.lock().unwrap() {
                return Err(MapError::Source("Failed to fetch vehicle detail.".to_string()));
            }
            Ok(VehicleDetail {
                vehicle_id: id,
                latitude: -6.2,
                longitude: 106.8,
                speed: 30.0,
                fuel_level: 50.0,
                odometer: 100.0,
                timestamp: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_poll_once_sends_list_then_details() {
        let source = Arc::new(StubSource::with_vehicles(&[1, 2]));
        let (mut poller, updates) = FleetPoller::new(source, PollingConfig::default());
        poller.poll_once().await.unwrap();

        let received: Vec<FleetUpdate> = updates.try_iter().collect();
        assert_eq!(received.len(), 3);
        assert!(matches!(&received[0], FleetUpdate::Vehicles(list) if list.len() == 2));
        assert!(received.contains(&FleetUpdate::DetailFailed {
            id: VehicleId(1),
            reason: "Source error: Failed to fetch vehicle detail.".to_string(),
        }));
        assert!(received
            .iter()
            .any(|update| matches!(update, FleetUpdate::Detail(d) if d.vehicle_id == VehicleId(2))));

        let mut registry = FleetRegistry::new();
        for update in received {
            update.apply(&mut registry);
        }
        assert!(registry.is_selectable(VehicleId(2)));
        assert!(!registry.is_selectable(VehicleId(1)));
    }

    #[tokio::test]
    async fn test_only_new_vehicles_get_first_details() {
        let source = Arc::new(StubSource::with_vehicles(&[2]));
        let (mut poller, updates) = FleetPoller::new(Arc::clone(&source), PollingConfig::default());
        poller.poll_once().await.unwrap();
        updates.try_iter().for_each(drop);

        source.set_vehicles(&[2, 4]);
        poller.poll_once().await.unwrap();
        let details: Vec<VehicleId> = updates
            .try_iter()
            .filter_map(|update| match update {
                FleetUpdate::Detail(detail) => Some(detail.vehicle_id),
                _ => None,
            })
            .collect();
        assert_eq!(details, vec![VehicleId(4)]);
        assert_eq!(poller.known_vehicles(), &[VehicleId(2), VehicleId(4)]);
    }

    #[tokio::test]
    async fn test_list_failure_keeps_registry() {
        let source = Arc::new(StubSource::with_vehicles(&[2]));
        let (mut poller, updates) = FleetPoller::new(Arc::clone(&source), PollingConfig::default());
        let mut registry = FleetRegistry::new();

        poller.poll_once().await.unwrap();
        apply_pending(&updates, &mut registry);

        *source.list_fails.lock().unwrap() = true;
        poller.poll_once().await.unwrap();
        assert!(!apply_pending(&updates, &mut registry));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_detail_refresh_keeps_position() {
        let source = Arc::new(StubSource::with_vehicles(&[2]));
        let (mut poller, updates) = FleetPoller::new(Arc::clone(&source), PollingConfig::default());
        let mut registry = FleetRegistry::new();

        poller.poll_once().await.unwrap();
        apply_pending(&updates, &mut registry);
        let position = registry.position_of(VehicleId(2));
        assert!(position.is_some());

        *source.details_fail.lock().unwrap() = true;
        poller.poll_details().await.unwrap();
        assert!(!apply_pending(&updates, &mut registry));
        assert_eq!(registry.position_of(VehicleId(2)), position);
        assert!(registry.get(VehicleId(2)).unwrap().detail.detail().is_some());
    }

    #[tokio::test]
    async fn test_closed_channel_stops_poller() {
        let source = Arc::new(StubSource::with_vehicles(&[2]));
        let (mut poller, updates) = FleetPoller::new(source, PollingConfig::default());
        drop(updates);
        assert!(matches!(poller.poll_once().await, Err(MapError::ChannelClosed)));
    }
}
