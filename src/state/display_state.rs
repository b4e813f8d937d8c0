//! Player-facing display state and the frames pushed to display clients

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{BreakTimer, TimerState};
use crate::utils::color::Rgb;

pub const DEFAULT_TITLE: &str = "ОСТАТОЧНОЕ ВРЕМЯ ПОХОДА";

/// Screen laid over the countdown on the player-facing window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    #[default]
    None,
    Black,
    Cube,
    Constructor,
    Custom,
}

impl Overlay {
    /// Image drawn on the black overlay, if any. Built-in animations are
    /// named by file; `Custom` uses the configured path.
    pub fn image<'a>(&self, custom: Option<&'a str>) -> Option<&'a str> {
        match self {
            Overlay::None | Overlay::Black => None,
            Overlay::Cube => Some("Background2.gif"),
            Overlay::Constructor => Some("Background1.gif"),
            Overlay::Custom => custom,
        }
    }
}

impl FromStr for Overlay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Overlay::None),
            "black" => Ok(Overlay::Black),
            "cube" => Ok(Overlay::Cube),
            "constructor" => Ok(Overlay::Constructor),
            "custom" => Ok(Overlay::Custom),
            other => Err(format!("Unknown overlay: {}", other)),
        }
    }
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Overlay::None => "none",
            Overlay::Black => "black",
            Overlay::Cube => "cube",
            Overlay::Constructor => "constructor",
            Overlay::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Title, colors and overlay of the player-facing window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayState {
    pub title: String,
    pub background: Rgb,
    /// Base text color, derived from the background
    pub text_color: Rgb,
    pub overlay: Overlay,
    /// Image for `Overlay::Custom`
    pub custom_overlay: Option<String>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            background: Rgb::BLACK,
            text_color: Rgb::WHITE,
            overlay: Overlay::None,
            custom_overlay: None,
        }
    }

    /// Change the background; text switches to black on light backgrounds
    pub fn set_background(&mut self, background: Rgb) {
        self.background = background;
        self.text_color = background.contrasting_text();
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a display needs to draw the countdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub time: String,
    pub remaining_seconds: u64,
    pub red_ratio: f64,
    pub blink_visible: bool,
    pub title: String,
    pub background: String,
    /// Title color with the red blend applied
    pub title_color: String,
    /// Same as `title_color`, or `transparent` during the hidden blink phase
    pub time_color: String,
    /// Share of the default total already elapsed, for the progress bar
    pub elapsed_ratio: f64,
    pub overlay: Overlay,
    pub overlay_image: Option<String>,
}

impl DisplayFrame {
    pub fn compose(timer: &TimerState, display: &DisplayState) -> Self {
        let red_ratio = timer.red_ratio();
        let color = display.text_color.blend_toward_red(red_ratio).to_hex();
        let time_color = if timer.blink_visible() {
            color.clone()
        } else {
            "transparent".to_string()
        };

        Self {
            time: timer.time_string(),
            remaining_seconds: timer.remaining_seconds(),
            red_ratio,
            blink_visible: timer.blink_visible(),
            title: display.title.clone(),
            background: display.background.to_hex(),
            title_color: color,
            time_color,
            elapsed_ratio: elapsed_ratio(timer.remaining_seconds(), timer.default_total_seconds()),
            overlay: display.overlay,
            overlay_image: display
                .overlay
                .image(display.custom_overlay.as_deref())
                .map(str::to_string),
        }
    }
}

impl Default for DisplayFrame {
    fn default() -> Self {
        Self::compose(&TimerState::default(), &DisplayState::default())
    }
}

fn elapsed_ratio(remaining: u64, total: u64) -> f64 {
    if total == 0 {
        return 1.0;
    }
    (1.0 - remaining as f64 / total as f64).clamp(0.0, 1.0)
}

/// Break timer overlay as seen by display clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakFrame {
    pub time: String,
    pub visible: bool,
    pub running: bool,
}

impl From<&BreakTimer> for BreakFrame {
    fn from(timer: &BreakTimer) -> Self {
        Self {
            time: timer.time_string(),
            visible: timer.enabled,
            running: timer.running,
        }
    }
}
