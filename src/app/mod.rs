pub mod controller;
pub mod controls;
pub mod error;
pub mod input;
pub mod runtime;

pub use controller::{ChartViewController, ControllerSettings};
pub use runtime::App;
