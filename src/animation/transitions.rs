use crate::animation::interpolation::{EasingFunction, Interpolation};
use crate::core::{geo::LatLng, viewport::Viewport};
use crate::prelude::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one camera sequence. Strictly increasing per sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which leg of the camera sequence a transition belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionStep {
    ZoomOut,
    Pan,
    ZoomIn,
}

/// Label attached to every transition handed to a map surface; the surface
/// echoes it back on completion so stale completions can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionTag {
    pub request: RequestId,
    pub step: TransitionStep,
}

impl TransitionTag {
    pub fn new(request: RequestId, step: TransitionStep) -> Self {
        Self { request, step }
    }
}

/// A timed viewport change requested from the hosting map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub target_center: LatLng,
    pub target_zoom: f64,
    pub duration: Duration,
    pub easing: EasingFunction,
}

impl TransitionRequest {
    pub fn new(target_center: LatLng, target_zoom: f64, duration: Duration) -> Self {
        Self {
            target_center,
            target_zoom,
            duration,
            easing: EasingFunction::Linear,
        }
    }

    /// Set the easing function
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }
}

/// State of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Running,
    Completed,
    Cancelled,
}

/// A running viewport transition, advanced by frame deltas
#[derive(Debug, Clone)]
pub struct Transition {
    pub tag: TransitionTag,
    pub request: TransitionRequest,
    pub state: TransitionState,
    /// Time advanced so far
    pub elapsed: Duration,
    /// Viewport when the transition started
    pub start_viewport: Viewport,
    /// Viewport after the last update
    pub current_viewport: Viewport,
}

impl Transition {
    /// Start a transition from `start_viewport`
    pub fn start(tag: TransitionTag, request: TransitionRequest, start_viewport: Viewport) -> Self {
        Self {
            tag,
            request,
            state: TransitionState::Running,
            elapsed: Duration::ZERO,
            start_viewport,
            current_viewport: start_viewport,
        }
    }

    /// Stop the transition without completing it
    pub fn cancel(&mut self) {
        if self.state == TransitionState::Running {
            self.state = TransitionState::Cancelled;
        }
    }

    /// Advance the transition. Returns true when this call completed it.
    pub fn update(&mut self, delta: Duration) -> bool {
        if self.state != TransitionState::Running {
            return false;
        }

        self.elapsed += delta;
        let progress = self.progress();
        let eased = self.request.easing.apply(progress);

        self.current_viewport.center = Interpolation::lat_lng(
            &self.start_viewport.center,
            &self.request.target_center,
            eased,
        );
        let zoom = Interpolation::linear(self.start_viewport.zoom, self.request.target_zoom, eased);
        self.current_viewport.set_zoom(zoom);

        if progress >= 1.0 {
            self.complete();
            return true;
        }
        false
    }

    fn complete(&mut self) {
        self.state = TransitionState::Completed;
        self.current_viewport.center = self.request.target_center;
        self.current_viewport.set_zoom(self.request.target_zoom);
    }

    /// Check if the transition is finished
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            TransitionState::Completed | TransitionState::Cancelled
        )
    }

    /// Get the current progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.request.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f64() / self.request.duration.as_secs_f64()).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag() -> TransitionTag {
        TransitionTag::new(RequestId(1), TransitionStep::Pan)
    }

    #[test]
    fn test_pan_transition() {
        let viewport = Viewport::new(LatLng::new(0.0, 100.0), 10.0);
        let target = LatLng::new(-6.0, 106.0);
        let request = TransitionRequest::new(target, 10.0, Duration::from_millis(600));
        let mut transition = Transition::start(tag(), request, viewport);

        assert!(!transition.update(Duration::from_millis(300)));
        assert_eq!(transition.current_viewport.center, LatLng::new(-3.0, 103.0));

        assert!(transition.update(Duration::from_millis(300)));
        assert!(transition.is_finished());
        assert_eq!(transition.current_viewport.center, target);
    }

    #[test]
    fn test_zoom_transition_is_clamped() {
        let viewport = Viewport::new(LatLng::new(0.0, 100.0), 10.0);
        let request = TransitionRequest::new(viewport.center, 30.0, Duration::from_millis(100));
        let mut transition = Transition::start(tag(), request, viewport);
        transition.update(Duration::from_millis(100));
        assert_eq!(transition.current_viewport.zoom, viewport.max_zoom);
    }

    #[test]
    fn test_cancelled_transition_stops_updating() {
        let viewport = Viewport::new(LatLng::new(0.0, 100.0), 10.0);
        let request = TransitionRequest::new(viewport.center, 5.0, Duration::from_millis(100));
        let mut transition = Transition::start(tag(), request, viewport);
        transition.cancel();
        assert!(!transition.update(Duration::from_millis(200)));
        assert_eq!(transition.state, TransitionState::Cancelled);
        assert_eq!(transition.current_viewport.zoom, 10.0);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let viewport = Viewport::new(LatLng::new(0.0, 100.0), 10.0);
        let request = TransitionRequest::new(viewport.center, 6.0, Duration::ZERO);
        let mut transition = Transition::start(tag(), request, viewport);
        assert!(transition.update(Duration::ZERO));
        assert_eq!(transition.current_viewport.zoom, 6.0);
    }
}
