//! Vehicle data: API records, the merged registry and the background poller

pub mod feed;
pub mod model;
pub mod registry;

pub use feed::{apply_pending, FleetPoller, FleetUpdate};
pub use registry::{DetailState, FleetRegistry};
