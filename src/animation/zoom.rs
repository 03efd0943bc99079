//! Distance to zoom-out level mapping.
//!
//! Before panning to a far-away vehicle the camera backs off so the
//! destination is on screen during the pan. Short hops barely zoom out; hops
//! across the archipelago go all the way to the map's minimum zoom. The
//! mapping is linear in `log10(distance)` between two reference distances.

use crate::core::constants::{MAX_REFERENCE_DISTANCE_M, MIN_REFERENCE_DISTANCE_M};
use serde::{Deserialize, Serialize};

/// Maps a travel distance to the zoom level to pass through while panning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomInterpolator {
    /// Distances at or below this produce no zoom-out
    pub min_distance: f64,
    /// Distances at or above this zoom out to the minimum zoom
    pub max_distance: f64,
}

impl ZoomInterpolator {
    pub fn new(min_distance: f64, max_distance: f64) -> Self {
        Self {
            min_distance,
            max_distance,
        }
    }

    /// Position of `distance` between the reference distances on a log scale,
    /// clamped to `[0, 1]`.
    pub fn ratio(&self, distance: f64) -> f64 {
        // Non-finite distances come from broken coordinates; treat as far away
        let distance = if distance.is_finite() {
            distance.max(self.min_distance)
        } else {
            self.max_distance
        };

        let log_min = self.min_distance.log10();
        let log_max = self.max_distance.log10();
        let span = log_max - log_min;
        if span <= 0.0 {
            return 1.0;
        }

        ((distance.log10() - log_min) / span).clamp(0.0, 1.0)
    }

    /// Zoom level to transition through before panning `distance` meters.
    ///
    /// Interpolates between `current_zoom` and `min_zoom`; never below `min_zoom`.
    pub fn zoom_out_level(&self, distance: f64, current_zoom: f64, min_zoom: f64) -> f64 {
        let ratio = self.ratio(distance);
        (current_zoom - ratio * (current_zoom - min_zoom)).max(min_zoom)
    }
}

impl Default for ZoomInterpolator {
    fn default() -> Self {
        Self::new(MIN_REFERENCE_DISTANCE_M, MAX_REFERENCE_DISTANCE_M)
    }
}
