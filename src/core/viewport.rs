use crate::core::{
    constants::{DEFAULT_CENTER_LNG_LAT, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM},
    geo::LatLng,
};
use serde::{Deserialize, Serialize};

/// The current view of the map: center and zoom within the map's zoom limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    /// Creates a new viewport with the default fleet map zoom limits
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self::with_zoom_limits(center, zoom, MIN_ZOOM, MAX_ZOOM)
    }

    /// Creates a viewport with explicit zoom limits
    pub fn with_zoom_limits(center: LatLng, zoom: f64, min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            center,
            zoom: clamp_zoom(zoom, min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        }
    }

    /// Sets the center of the viewport
    pub fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = self.clamp_zoom(zoom);
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = clamp_zoom(self.zoom, min_zoom, max_zoom);
    }

    /// Clamps a zoom value into this viewport's limits
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        clamp_zoom(zoom, self.min_zoom, self.max_zoom)
    }

    /// A viewport the camera math can work from: a valid center and finite zoom
    pub fn is_valid(&self) -> bool {
        self.center.is_valid() && self.zoom.is_finite()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::from_lng_lat(DEFAULT_CENTER_LNG_LAT), DEFAULT_ZOOM)
    }
}

// NaN passes through so invalid state stays detectable by `is_valid`
fn clamp_zoom(zoom: f64, min_zoom: f64, max_zoom: f64) -> f64 {
    if zoom.is_nan() {
        zoom
    } else {
        zoom.clamp(min_zoom, max_zoom)
    }
}
