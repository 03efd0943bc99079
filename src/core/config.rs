//! Configuration for camera animation and fleet polling
//!
//! Camera behaviour is picked through an [`AnimationProfile`] preset, or a
//! fully custom [`CameraConfig`]. The whole configuration can be loaded from
//! JSON; missing fields fall back to the defaults in `core::constants`.

use crate::animation::{interpolation::EasingFunction, zoom::ZoomInterpolator};
use crate::core::constants::{
    MAX_ZOOM, MIN_ZOOM, PAN_DURATION_MS, SETTLE_ZOOM, STEP_TIMEOUT_GRACE_MS,
    VEHICLE_DETAIL_POLL_MS, VEHICLE_LIST_POLL_MS, ZOOM_IN_DURATION_MS, ZOOM_OUT_DURATION_MS,
};
use crate::prelude::Duration;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationProfile {
    /// Zoom out, pan, zoom in
    #[default]
    Standard,
    /// No camera animation; selections jump straight to the vehicle
    Reduced,
    Custom(CameraConfig),
}

impl AnimationProfile {
    pub fn resolve(&self) -> CameraConfig {
        match self {
            Self::Standard => CameraConfig::default(),
            Self::Reduced => CameraConfig {
                enable_transitions: false,
                ..CameraConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

/// Camera sequence tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub enable_transitions: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// The camera settles on a vehicle at `max(settle_zoom, starting zoom)`
    pub settle_zoom: f64,
    pub zoom_out_duration_ms: u64,
    pub pan_duration_ms: u64,
    pub zoom_in_duration_ms: u64,
    /// How long past its duration a step may run before it is force-completed
    pub step_timeout_grace_ms: u64,
    pub easing: EasingFunction,
    pub zoom: ZoomInterpolator,
}

impl CameraConfig {
    pub fn zoom_out_duration(&self) -> Duration {
        Duration::from_millis(self.zoom_out_duration_ms)
    }

    pub fn pan_duration(&self) -> Duration {
        Duration::from_millis(self.pan_duration_ms)
    }

    pub fn zoom_in_duration(&self) -> Duration {
        Duration::from_millis(self.zoom_in_duration_ms)
    }

    pub fn step_timeout_grace(&self) -> Duration {
        Duration::from_millis(self.step_timeout_grace_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite()) {
            return Err(MapError::Config("zoom limits must be finite".to_string()));
        }
        if self.min_zoom > self.max_zoom {
            return Err(MapError::Config(format!(
                "min_zoom {} is above max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if !self.settle_zoom.is_finite() {
            return Err(MapError::Config("settle_zoom must be finite".to_string()));
        }
        if !(self.zoom.min_distance > 0.0 && self.zoom.max_distance > self.zoom.min_distance) {
            return Err(MapError::Config(format!(
                "reference distances must satisfy 0 < min < max (got {} / {})",
                self.zoom.min_distance, self.zoom.max_distance
            )));
        }
        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            enable_transitions: true,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            settle_zoom: SETTLE_ZOOM,
            zoom_out_duration_ms: ZOOM_OUT_DURATION_MS,
            pan_duration_ms: PAN_DURATION_MS,
            zoom_in_duration_ms: ZOOM_IN_DURATION_MS,
            step_timeout_grace_ms: STEP_TIMEOUT_GRACE_MS,
            easing: EasingFunction::Linear,
            zoom: ZoomInterpolator::default(),
        }
    }
}

/// Refresh intervals for the fleet feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub vehicle_list_interval_ms: u64,
    pub vehicle_detail_interval_ms: u64,
}

impl PollingConfig {
    pub fn vehicle_list_interval(&self) -> Duration {
        Duration::from_millis(self.vehicle_list_interval_ms)
    }

    pub fn vehicle_detail_interval(&self) -> Duration {
        Duration::from_millis(self.vehicle_detail_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vehicle_list_interval_ms == 0 || self.vehicle_detail_interval_ms == 0 {
            return Err(MapError::Config(
                "polling intervals must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            vehicle_list_interval_ms: VEHICLE_LIST_POLL_MS,
            vehicle_detail_interval_ms: VEHICLE_DETAIL_POLL_MS,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetMapConfig {
    pub profile: AnimationProfile,
    pub polling: PollingConfig,
}

impl FleetMapConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn camera(&self) -> CameraConfig {
        self.profile.resolve()
    }

    pub fn validate(&self) -> Result<()> {
        self.camera().validate()?;
        self.polling.validate()
    }
}
