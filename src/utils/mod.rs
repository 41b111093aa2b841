//! Utility modules: logging setup and chart rendering

pub mod charts;
pub mod logging;

pub use charts::render_history_charts;
pub use logging::{init_logging, LogConfig};
