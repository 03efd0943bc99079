pub mod animator;
pub mod interpolation;
pub mod sequencer;
pub mod transitions;
pub mod zoom;

// Re-export commonly used types and functions for convenience
pub use animator::{CameraAnimator, CameraEvent};
pub use interpolation::{EasingFunction, Interpolation};
pub use sequencer::{CameraCommand, CameraSequencer, SequenceState};
pub use transitions::{Transition, TransitionRequest, TransitionTag};
pub use zoom::ZoomInterpolator;
