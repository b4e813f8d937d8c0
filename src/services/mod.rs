//! External service module
//!
//! Audio playback for cue sounds.

pub mod audio;

// Re-export main types
pub use audio::*;
