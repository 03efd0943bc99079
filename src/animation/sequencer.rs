//! Zoom-out, pan, zoom-in camera sequence
//!
//! Selecting a vehicle far from the current view runs three timed
//! transitions, each started when the previous one reports completion:
//!
//! ```text
//! Idle -> ZoomingOut -> Panning -> ZoomingIn -> Idle (settled)
//! ```
//!
//! Every sequence gets a fresh [`RequestId`], strictly larger than any
//! before it, and every transition handed to the map carries a
//! [`TransitionTag`] naming that id and the step. A completion whose tag
//! does not match the current state belongs to a superseded sequence (or an
//! already finished step) and is dropped, so a late event can never advance
//! a newer selection.
//!
//! The sequencer owns no map state. It turns inputs into [`CameraCommand`]s
//! that the caller applies to the surface.

use crate::animation::transitions::{RequestId, TransitionRequest, TransitionStep, TransitionTag};
use crate::core::{config::CameraConfig, geo::LatLng, viewport::Viewport};
use crate::fleet::model::VehicleId;
use crate::prelude::{Duration, Instant};
use crate::{MapError, Result};

/// A sequence in flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveSequence {
    pub request: RequestId,
    pub vehicle: VehicleId,
    pub target: LatLng,
    /// Zoom held while panning
    pub zoom_out: f64,
    /// Zoom the camera settles at
    pub settle_zoom: f64,
    /// When the current step must have completed
    pub deadline: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SequenceState {
    #[default]
    Idle,
    ZoomingOut(ActiveSequence),
    Panning(ActiveSequence),
    ZoomingIn(ActiveSequence),
}

impl SequenceState {
    pub fn active(&self) -> Option<&ActiveSequence> {
        match self {
            Self::Idle => None,
            Self::ZoomingOut(active) | Self::Panning(active) | Self::ZoomingIn(active) => {
                Some(active)
            }
        }
    }

    /// The step whose completion this state waits for
    pub fn step(&self) -> Option<TransitionStep> {
        match self {
            Self::Idle => None,
            Self::ZoomingOut(_) => Some(TransitionStep::ZoomOut),
            Self::Panning(_) => Some(TransitionStep::Pan),
            Self::ZoomingIn(_) => Some(TransitionStep::ZoomIn),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// What the caller must do next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    /// Start a transition on the map
    Animate {
        tag: TransitionTag,
        request: TransitionRequest,
    },
    /// Move instantly; the sequence is already settled
    Jump {
        vehicle: VehicleId,
        center: LatLng,
        zoom: f64,
    },
    /// The camera rests on the vehicle
    Settled { vehicle: VehicleId, position: LatLng },
}

#[derive(Debug)]
pub struct CameraSequencer {
    config: CameraConfig,
    state: SequenceState,
    last_request: u64,
}

impl CameraSequencer {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            state: SequenceState::Idle,
            last_request: 0,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// Id of the most recently started sequence, if any
    pub fn latest_request(&self) -> Option<RequestId> {
        (self.last_request > 0).then_some(RequestId(self.last_request))
    }

    /// Begin a sequence towards `target`, superseding any running one.
    ///
    /// An invalid target is rejected. If the current viewport is unusable or
    /// transitions are disabled, the camera jumps straight to the settled view.
    pub fn start(
        &mut self,
        vehicle: VehicleId,
        target: LatLng,
        viewport: &Viewport,
        now: Instant,
    ) -> Result<CameraCommand> {
        if !target.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "vehicle {vehicle} target ({}, {})",
                target.lat, target.lng
            )));
        }

        if let Some(previous) = self.state.active() {
            log::debug!(
                "sequence {} for vehicle {} superseded by vehicle {vehicle}",
                previous.request,
                previous.vehicle
            );
        }

        self.last_request += 1;
        let request = RequestId(self.last_request);

        let start_zoom = if viewport.zoom.is_finite() {
            viewport.zoom
        } else {
            self.config.min_zoom
        };
        let settle_zoom = self.clamp_zoom(viewport, self.config.settle_zoom.max(start_zoom));

        if !self.config.enable_transitions || !viewport.is_valid() {
            if self.config.enable_transitions {
                log::warn!(
                    "viewport ({}, {}) @ {} unusable, jumping to vehicle {vehicle}",
                    viewport.center.lat,
                    viewport.center.lng,
                    viewport.zoom
                );
            }
            self.state = SequenceState::Idle;
            return Ok(CameraCommand::Jump {
                vehicle,
                center: target,
                zoom: settle_zoom,
            });
        }

        let distance = viewport.center.distance_to(&target);
        let min_zoom = self.config.min_zoom.max(viewport.min_zoom);
        let zoom_out = self.clamp_zoom(
            viewport,
            self.config.zoom.zoom_out_level(distance, start_zoom, min_zoom),
        );

        log::debug!(
            "sequence {request}: vehicle {vehicle} at {distance:.0} m, zoom {start_zoom:.2} -> {zoom_out:.2} -> {settle_zoom:.2}"
        );

        let duration = self.config.zoom_out_duration();
        let active = ActiveSequence {
            request,
            vehicle,
            target,
            zoom_out,
            settle_zoom,
            deadline: self.deadline(now, duration),
        };
        self.state = SequenceState::ZoomingOut(active);

        Ok(self.animate(
            TransitionTag::new(request, TransitionStep::ZoomOut),
            viewport.center,
            zoom_out,
            duration,
        ))
    }

    /// Feed a completion event from the map.
    ///
    /// Returns `None` for stale events that do not belong to the current step.
    pub fn on_transition_complete(
        &mut self,
        tag: TransitionTag,
        now: Instant,
    ) -> Option<CameraCommand> {
        let current = self.state.active().map(|active| active.request);
        if current != Some(tag.request) || self.state.step() != Some(tag.step) {
            log::debug!(
                "ignoring stale completion {} {:?} (current {:?} {:?})",
                tag.request,
                tag.step,
                current,
                self.state.step()
            );
            return None;
        }
        self.advance(now)
    }

    /// Force-complete a step that overran its deadline.
    ///
    /// Covers maps that never report completion for a transition.
    pub fn check_timeout(&mut self, now: Instant) -> Option<CameraCommand> {
        let active = self.state.active()?;
        if now < active.deadline {
            return None;
        }
        log::warn!(
            "sequence {} step {:?} timed out, forcing completion",
            active.request,
            self.state.step()
        );
        self.advance(now)
    }

    /// Abandon the running sequence; its pending completions become stale
    pub fn cancel(&mut self) {
        if let Some(active) = self.state.active() {
            log::debug!("sequence {} cancelled", active.request);
        }
        self.state = SequenceState::Idle;
    }

    // Transition table: one step forward from the current state
    fn advance(&mut self, now: Instant) -> Option<CameraCommand> {
        match self.state {
            SequenceState::Idle => None,
            SequenceState::ZoomingOut(active) => {
                let duration = self.config.pan_duration();
                self.state = SequenceState::Panning(ActiveSequence {
                    deadline: self.deadline(now, duration),
                    ..active
                });
                Some(self.animate(
                    TransitionTag::new(active.request, TransitionStep::Pan),
                    active.target,
                    active.zoom_out,
                    duration,
                ))
            }
            SequenceState::Panning(active) => {
                let duration = self.config.zoom_in_duration();
                self.state = SequenceState::ZoomingIn(ActiveSequence {
                    deadline: self.deadline(now, duration),
                    ..active
                });
                Some(self.animate(
                    TransitionTag::new(active.request, TransitionStep::ZoomIn),
                    active.target,
                    active.settle_zoom,
                    duration,
                ))
            }
            SequenceState::ZoomingIn(active) => {
                self.state = SequenceState::Idle;
                log::debug!("sequence {} settled on vehicle {}", active.request, active.vehicle);
                Some(CameraCommand::Settled {
                    vehicle: active.vehicle,
                    position: active.target,
                })
            }
        }
    }

    fn animate(
        &self,
        tag: TransitionTag,
        center: LatLng,
        zoom: f64,
        duration: Duration,
    ) -> CameraCommand {
        CameraCommand::Animate {
            tag,
            request: TransitionRequest::new(center, zoom, duration).with_easing(self.config.easing),
        }
    }

    fn deadline(&self, now: Instant, duration: Duration) -> Instant {
        now + duration + self.config.step_timeout_grace()
    }

    fn clamp_zoom(&self, viewport: &Viewport, zoom: f64) -> f64 {
        let min = self.config.min_zoom.max(viewport.min_zoom);
        let max = self.config.max_zoom.min(viewport.max_zoom).max(min);
        zoom.clamp(min, max)
    }
}

impl Default for CameraSequencer {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
