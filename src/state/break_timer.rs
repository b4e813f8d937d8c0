//! Break timer shown in the corner of the player-facing display

use serde::{Deserialize, Serialize};

/// Default break length (10 minutes)
pub const DEFAULT_BREAK_SECONDS: u64 = 600;

/// Control actions accepted by the break timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakAction {
    Play,
    Pause,
    Stop,
}

impl std::str::FromStr for BreakAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "stop" => Ok(Self::Stop),
            other => Err(format!("Unknown break action: {}", other)),
        }
    }
}

/// Independent countdown, unaffected by the main timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakTimer {
    pub total_seconds: u64,
    pub current_seconds: u64,
    pub enabled: bool,
    pub running: bool,
}

impl BreakTimer {
    pub fn new() -> Self {
        Self {
            total_seconds: DEFAULT_BREAK_SECONDS,
            current_seconds: DEFAULT_BREAK_SECONDS,
            enabled: false,
            running: false,
        }
    }

    /// Show or hide the break timer and reset it to `total_seconds`
    pub fn configure(&mut self, enabled: bool, total_seconds: u64) {
        self.enabled = enabled;
        self.total_seconds = total_seconds;
        self.current_seconds = total_seconds;
        if !enabled {
            self.running = false;
        }
    }

    /// Apply a control action. Returns true if anything changed.
    pub fn apply(&mut self, action: BreakAction) -> bool {
        match action {
            BreakAction::Play => {
                if self.running {
                    return false;
                }
                self.running = true;
                true
            }
            BreakAction::Pause => {
                let was_running = self.running;
                self.running = false;
                was_running
            }
            BreakAction::Stop => {
                self.running = false;
                self.current_seconds = self.total_seconds;
                true
            }
        }
    }

    /// One-second tick. Stops itself once it reaches zero.
    pub fn tick(&mut self) {
        if self.current_seconds > 0 {
            self.current_seconds -= 1;
        } else {
            self.running = false;
        }
    }

    /// Remaining break time as `MM:SS`
    pub fn time_string(&self) -> String {
        format!("{:02}:{:02}", self.current_seconds / 60, self.current_seconds % 60)
    }
}

impl Default for BreakTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_and_stops_at_zero() {
        let mut timer = BreakTimer::new();
        timer.configure(true, 2);
        assert!(timer.apply(BreakAction::Play));
        timer.tick();
        timer.tick();
        assert_eq!(timer.time_string(), "00:00");
        assert!(timer.running);
        timer.tick();
        assert!(!timer.running);
        assert_eq!(timer.current_seconds, 0);
    }

    #[test]
    fn stop_resets_to_total() {
        let mut timer = BreakTimer::new();
        timer.apply(BreakAction::Play);
        timer.tick();
        assert_eq!(timer.time_string(), "09:59");
        timer.apply(BreakAction::Stop);
        assert_eq!(timer.current_seconds, DEFAULT_BREAK_SECONDS);
        assert!(!timer.running);
    }

    #[test]
    fn disabling_stops_the_timer() {
        let mut timer = BreakTimer::new();
        timer.configure(true, 90);
        timer.apply(BreakAction::Play);
        timer.configure(false, 0);
        assert!(!timer.running);
        assert!(!timer.enabled);
    }

    #[test]
    fn parses_actions() {
        assert_eq!("pause".parse::<BreakAction>(), Ok(BreakAction::Pause));
        assert!("rewind".parse::<BreakAction>().is_err());
    }
}
