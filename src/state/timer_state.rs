//! Countdown timer state: cue thresholds, red blend and blink effects

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Total restored by `stop()` unless configured otherwise (5 hours)
pub const DEFAULT_TOTAL_SECONDS: u64 = 5 * 3600;
/// Red blend starts ramping 10 minutes before the end
pub const DEFAULT_RED_EFFECT_START_SECONDS: u64 = 600;
/// Time label blinks during the last 10 seconds
pub const DEFAULT_BLINK_EFFECT_START_SECONDS: u64 = 10;

/// A cue produced by a tick or a preview request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CueFired {
    /// Play the sound right away
    Play { threshold: u64, path: String },
    /// Time is up: the sound is played only after a confirmation
    ConfirmEnd { path: String },
}

/// Serializable view of the timer for status responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub running: bool,
    pub paused: bool,
    pub muted: bool,
    pub remaining_seconds: u64,
    pub time: String,
    pub default_total_seconds: u64,
    pub red_effect_start_seconds: u64,
    pub blink_effect_start_seconds: u64,
    pub red_ratio: f64,
    pub blink_visible: bool,
    pub blink_active: bool,
    pub last_fired_threshold: Option<u64>,
    pub cues: BTreeMap<u64, String>,
}

/// The countdown with its effect scheduling.
///
/// The struct only decides *what* should happen; the ticker task owns the
/// actual intervals and reads [`TimerState::second_tick_active`] and
/// [`TimerState::blink_tick_active`] after every mutation.
#[derive(Debug, Clone)]
pub struct TimerState {
    default_total_seconds: u64,
    remaining_seconds: u64,
    running: bool,
    paused: bool,
    muted: bool,
    cues: BTreeMap<u64, String>,
    last_fired_threshold: Option<u64>,
    red_effect_start_seconds: u64,
    blink_effect_start_seconds: u64,
    blink_visible: bool,
    blink_ticking: bool,
}

impl TimerState {
    /// Create a stopped timer holding `default_total_seconds`
    pub fn new(default_total_seconds: u64) -> Self {
        Self {
            default_total_seconds,
            remaining_seconds: default_total_seconds,
            running: false,
            paused: false,
            muted: false,
            cues: BTreeMap::new(),
            last_fired_threshold: None,
            red_effect_start_seconds: DEFAULT_RED_EFFECT_START_SECONDS,
            blink_effect_start_seconds: DEFAULT_BLINK_EFFECT_START_SECONDS,
            blink_visible: true,
            blink_ticking: false,
        }
    }

    /// Set the remaining time to the literal sum of the parts
    pub fn set_total(&mut self, hours: u64, minutes: u64, seconds: u64) {
        self.remaining_seconds = hours
            .saturating_mul(3600)
            .saturating_add(minutes.saturating_mul(60))
            .saturating_add(seconds);
        self.last_fired_threshold = None;
    }

    /// Add (or with a negative delta, remove) whole minutes, clamped at zero
    pub fn adjust(&mut self, delta_minutes: i64) {
        let delta = delta_minutes.saturating_mul(60);
        self.remaining_seconds = if delta >= 0 {
            self.remaining_seconds.saturating_add(delta.unsigned_abs())
        } else {
            self.remaining_seconds.saturating_sub(delta.unsigned_abs())
        };
        self.last_fired_threshold = None;
    }

    /// Start counting down. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.paused = false;
        if self.within_blink_range() {
            self.blink_ticking = true;
        }
        true
    }

    /// Pause a running timer. The time stays visible while paused.
    pub fn pause(&mut self) -> bool {
        if !self.running || self.paused {
            return false;
        }
        self.paused = true;
        self.blink_ticking = false;
        self.blink_visible = true;
        true
    }

    /// Resume a paused timer
    pub fn resume(&mut self) -> bool {
        if !self.running || !self.paused {
            return false;
        }
        self.paused = false;
        if self.within_blink_range() {
            self.blink_ticking = true;
        }
        true
    }

    /// Stop and restore the default total
    pub fn stop(&mut self) {
        self.running = false;
        self.paused = false;
        self.remaining_seconds = self.default_total_seconds;
        self.last_fired_threshold = None;
        self.blink_ticking = false;
        self.blink_visible = true;
    }

    /// One-second tick. Fires at most one cue, then counts down.
    /// A stopped or paused timer ignores the tick.
    pub fn on_second_tick(&mut self) -> Option<CueFired> {
        if !self.second_tick_active() {
            return None;
        }
        let fired = self.fire_cue_at_remaining();

        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }

        if self.within_blink_range() {
            if !self.blink_ticking && self.second_tick_active() {
                self.blink_ticking = true;
            }
        } else {
            self.blink_ticking = false;
            self.blink_visible = true;
        }

        fired
    }

    /// Blink tick: flips visibility. Returns false when blinking is off.
    pub fn on_blink_tick(&mut self) -> bool {
        if !self.blink_ticking {
            return false;
        }
        self.blink_visible = !self.blink_visible;
        true
    }

    fn fire_cue_at_remaining(&mut self) -> Option<CueFired> {
        if self.muted || self.last_fired_threshold == Some(self.remaining_seconds) {
            return None;
        }
        let threshold = self.remaining_seconds;
        let path = self.cues.get(&threshold)?.clone();
        self.last_fired_threshold = Some(threshold);

        if threshold == 0 {
            Some(CueFired::ConfirmEnd { path })
        } else {
            Some(CueFired::Play { threshold, path })
        }
    }

    fn within_blink_range(&self) -> bool {
        self.remaining_seconds <= self.blink_effect_start_seconds
    }

    /// Bind a sound to a threshold, or clear it with `None`.
    /// Returns the previous binding.
    pub fn register_cue(&mut self, threshold: u64, path: Option<String>) -> Option<String> {
        match path {
            Some(path) if !path.is_empty() => self.cues.insert(threshold, path),
            _ => self.cues.remove(&threshold),
        }
    }

    /// Play the bound sound now, outside the countdown
    pub fn preview_cue(&self, threshold: u64) -> Option<CueFired> {
        self.cues.get(&threshold).map(|path| CueFired::Play {
            threshold,
            path: path.clone(),
        })
    }

    pub fn cues(&self) -> &BTreeMap<u64, String> {
        &self.cues
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn set_red_effect_start(&mut self, seconds: u64) {
        self.red_effect_start_seconds = seconds;
    }

    pub fn set_blink_effect_start(&mut self, seconds: u64) {
        self.blink_effect_start_seconds = seconds;
    }

    /// Change the total that `stop()` restores. A stopped timer picks it up immediately.
    pub fn set_default_total(&mut self, seconds: u64) {
        self.default_total_seconds = seconds;
        if !self.running {
            self.remaining_seconds = seconds;
            self.last_fired_threshold = None;
        }
    }

    /// Blend factor toward red, 0 outside the effect window and 1 at zero
    pub fn red_ratio(&self) -> f64 {
        if self.red_effect_start_seconds == 0
            || self.remaining_seconds > self.red_effect_start_seconds
        {
            return 0.0;
        }
        let ratio = 1.0 - self.remaining_seconds as f64 / self.red_effect_start_seconds as f64;
        ratio.clamp(0.0, 1.0)
    }

    /// Remaining time as `HH:MM:SS`
    pub fn time_string(&self) -> String {
        let hours = self.remaining_seconds / 3600;
        let minutes = (self.remaining_seconds % 3600) / 60;
        let seconds = self.remaining_seconds % 60;
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }

    /// The one-second tick runs while running and not paused
    pub fn second_tick_active(&self) -> bool {
        self.running && !self.paused
    }

    pub fn blink_tick_active(&self) -> bool {
        self.blink_ticking
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            running: self.running,
            paused: self.paused,
            muted: self.muted,
            remaining_seconds: self.remaining_seconds,
            time: self.time_string(),
            default_total_seconds: self.default_total_seconds,
            red_effect_start_seconds: self.red_effect_start_seconds,
            blink_effect_start_seconds: self.blink_effect_start_seconds,
            red_ratio: self.red_ratio(),
            blink_visible: self.blink_visible,
            blink_active: self.blink_ticking,
            last_fired_threshold: self.last_fired_threshold,
            cues: self.cues.clone(),
        }
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn default_total_seconds(&self) -> u64 {
        self.default_total_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn blink_visible(&self) -> bool {
        self.blink_visible
    }

    pub fn last_fired_threshold(&self) -> Option<u64> {
        self.last_fired_threshold
    }

    pub fn red_effect_start_seconds(&self) -> u64 {
        self.red_effect_start_seconds
    }

    pub fn blink_effect_start_seconds(&self) -> u64 {
        self.blink_effect_start_seconds
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_SECONDS)
    }
}
