//! Prelude module for common fleetmap types and traits
//!
//! Re-exports the most commonly used types for `use fleetmap::prelude::*;`

pub use crate::core::{
    config::{AnimationProfile, CameraConfig, FleetMapConfig, PollingConfig},
    geo::{LatLng, LatLngBounds},
    map::{HeadlessMap, MapResources},
    viewport::Viewport,
};

pub use crate::animation::{
    animator::{CameraAnimator, CameraEvent},
    sequencer::{CameraCommand, CameraSequencer},
    transitions::{RequestId, TransitionRequest, TransitionTag},
};

pub use crate::fleet::{
    feed::{FleetPoller, FleetUpdate},
    model::{VehicleDetail, VehicleId, VehicleSummary},
    registry::{DetailState, FleetRegistry},
};

pub use crate::runtime::{runtime, spawn, AsyncHandle, AsyncSpawner};

pub use crate::traits::{FleetSource, MapSurface, SurfaceEvent};

pub use crate::{Error as MapError, Result};

pub use instant::Instant;
pub use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
