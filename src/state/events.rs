//! Events published to subscribers (audio dispatch, display clients)

use serde::{Deserialize, Serialize};

use super::{BreakFrame, CueFired, DisplayFrame};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    /// Play a sound file, fire-and-forget
    PlaySound { path: String },
    /// Time is up; a sound is waiting for confirmation
    ConfirmEnd { path: String },
    /// New countdown frame after a tick, blink or state change
    Display { frame: DisplayFrame },
    /// Break timer overlay changed
    Break { frame: BreakFrame },
}

impl TimerEvent {
    /// Name used for the SSE `event:` field
    pub fn kind(&self) -> &'static str {
        match self {
            TimerEvent::PlaySound { .. } => "play_sound",
            TimerEvent::ConfirmEnd { .. } => "confirm_end",
            TimerEvent::Display { .. } => "display",
            TimerEvent::Break { .. } => "break",
        }
    }
}

impl From<CueFired> for TimerEvent {
    fn from(cue: CueFired) -> Self {
        match cue {
            CueFired::Play { path, .. } => TimerEvent::PlaySound { path },
            CueFired::ConfirmEnd { path } => TimerEvent::ConfirmEnd { path },
        }
    }
}
