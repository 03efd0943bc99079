pub mod popup;

pub use popup::{PopupAction, VehiclePopup};
