//! Konstruktor Timer - countdown service for live game sessions
//!
//! This library provides the game-master countdown: sound cues at fixed
//! remaining-time thresholds, a red tint and blinking as time runs out,
//! a break timer, and an HTTP API for control panels and player displays.

pub mod config;
pub mod settings;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use settings::TimerSettings;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
