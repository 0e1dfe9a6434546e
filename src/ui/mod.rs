pub mod chart;
pub mod layout;
pub mod statusbar;
pub mod theme;
pub mod timeframe;

pub use chart::Chart;
pub use layout::render;
pub use statusbar::StatusBar;
pub use theme::Theme;
pub use timeframe::{Timeframe, TimeframeSelector};
