//! Utility functions module
//!
//! Color handling for the display and shutdown signal handling.

pub mod color;
pub mod signals;

// Re-export main functions
pub use color::Rgb;
pub use signals::shutdown_signal;
