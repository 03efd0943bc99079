//! Engine-wide numbers for the fleet map view.
//! Keeping them in a single place makes it easier to tweak the camera feel.

/// Lowest zoom the hosting map allows.
pub const MIN_ZOOM: f64 = 4.0;

/// Highest zoom the hosting map allows.
pub const MAX_ZOOM: f64 = 14.0;

/// Initial zoom of the fleet map.
pub const DEFAULT_ZOOM: f64 = 5.0;

/// Initial map center as `[longitude, latitude]` (central Indonesia).
pub const DEFAULT_CENTER_LNG_LAT: [f64; 2] = [117.92, -2.56];

/// Map extent as `[west, south, east, north]`.
pub const DEFAULT_EXTENT: [f64; 4] = [92.0, -11.0, 141.0, 9.5];

/// The camera never settles on a vehicle below this zoom.
pub const SETTLE_ZOOM: f64 = 12.0;

/// Hops at or below this distance (meters) produce no zoom-out.
pub const MIN_REFERENCE_DISTANCE_M: f64 = 10_000.0;

/// Hops at or above this distance (meters) zoom all the way out.
pub const MAX_REFERENCE_DISTANCE_M: f64 = 2_700_000.0;

/// Duration of the zoom-out step.
pub const ZOOM_OUT_DURATION_MS: u64 = 400;

/// Duration of the pan step.
pub const PAN_DURATION_MS: u64 = 600;

/// Duration of the zoom-in step.
pub const ZOOM_IN_DURATION_MS: u64 = 600;

/// Extra time a step may take past its duration before it is force-completed.
pub const STEP_TIMEOUT_GRACE_MS: u64 = 1_000;

/// Vehicle list refresh interval.
pub const VEHICLE_LIST_POLL_MS: u64 = 60_000;

/// Per-vehicle detail refresh interval.
pub const VEHICLE_DETAIL_POLL_MS: u64 = 70_000;

/// Popup offset above the marker pin, in pixels.
pub const POPUP_OFFSET: (f64, f64) = (0.0, -18.0);
