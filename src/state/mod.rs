//! State management module
//!
//! The countdown scheduler, the break timer, the display state and the
//! shared `AppState` that wires them to the ticker and the HTTP API.

pub mod app_state;
pub mod break_timer;
pub mod display_state;
pub mod events;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, TickPlan};
pub use break_timer::{BreakAction, BreakTimer};
pub use display_state::{BreakFrame, DisplayFrame, DisplayState, Overlay};
pub use events::TimerEvent;
pub use timer_state::{CueFired, TimerState};
