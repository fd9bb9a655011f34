// Export the logging macros before any module that uses them
#[macro_use]
pub mod logging;

pub mod bridge;
pub mod consts;
pub mod control;
pub mod controller;
pub mod errors;
pub mod state;
pub mod sync;
pub mod tasks;
pub mod types;

#[cfg(feature = "sim")]
pub mod sim;

pub use controller::OffboardController;

// Re-exported for implementors of the bridge traits
pub use embassy_time;
pub use nalgebra;
