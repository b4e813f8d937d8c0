//! Main application state management

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{
    BreakAction, BreakFrame, BreakTimer, CueFired, DisplayFrame, DisplayState, Overlay,
    TimerEvent, TimerState,
};
use crate::{settings::TimerSettings, utils::color::Rgb};

/// Capacity of the event channel; slow SSE clients beyond this lag and skip
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Which periodic ticks should be running.
///
/// Each active tick carries the generation at which it was (re)started, so the
/// ticker can tell a pause/resume pair apart from an uninterrupted run even if
/// it only observes the final value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickPlan {
    pub second: Option<u64>,
    pub blink: Option<u64>,
    pub break_tick: Option<u64>,
    generation: u64,
}

impl TickPlan {
    fn set_timer(&mut self, second: bool, blink: bool) -> bool {
        let before = *self;
        self.second = self.activate(before.second, second);
        self.blink = self.activate(before.blink, blink);
        *self != before
    }

    fn set_break(&mut self, running: bool) -> bool {
        let before = *self;
        self.break_tick = self.activate(before.break_tick, running);
        *self != before
    }

    fn activate(&mut self, slot: Option<u64>, wanted: bool) -> Option<u64> {
        match (slot, wanted) {
            (None, true) => {
                self.generation += 1;
                Some(self.generation)
            }
            (_, false) => None,
            (current, true) => current,
        }
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, String> {
    mutex
        .lock()
        .map_err(|e| format!("Failed to lock {}: {}", what, e))
}

/// Main application state shared by the ticker, the cue dispatcher and the API
#[derive(Debug)]
pub struct AppState {
    /// Countdown with cue and effect scheduling
    pub timer_state: Arc<Mutex<TimerState>>,
    pub break_timer: Arc<Mutex<BreakTimer>>,
    pub display_state: Arc<Mutex<DisplayState>>,
    /// End cue waiting for a yes/no answer
    pub pending_end_cue: Arc<Mutex<Option<String>>>,
    /// Where `save_settings` writes to
    pub settings_path: Option<PathBuf>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Every scheduler event, in emission order
    pub event_tx: broadcast::Sender<TimerEvent>,
    /// Latest display frame
    pub display_tx: watch::Sender<DisplayFrame>,
    pub _display_rx: watch::Receiver<DisplayFrame>,
    /// Periodic ticks the ticker task should drive
    pub tick_plan_tx: watch::Sender<TickPlan>,
    pub _tick_plan_rx: watch::Receiver<TickPlan>,
}

impl AppState {
    /// Create a new AppState with a stopped timer built from `settings`
    pub fn new(port: u16, host: String, settings: TimerSettings) -> Self {
        let mut timer = TimerState::new(settings.default_total_seconds);
        timer.set_red_effect_start(settings.red_effect_start_seconds);
        timer.set_blink_effect_start(settings.blink_effect_start_seconds);
        for (threshold, path) in settings.cues {
            timer.register_cue(threshold, Some(path));
        }

        let display = DisplayState::new();
        let initial_frame = DisplayFrame::compose(&timer, &display);

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (display_tx, display_rx) = watch::channel(initial_frame);
        let (tick_plan_tx, tick_plan_rx) = watch::channel(TickPlan::default());

        Self {
            timer_state: Arc::new(Mutex::new(timer)),
            break_timer: Arc::new(Mutex::new(BreakTimer::new())),
            display_state: Arc::new(Mutex::new(display)),
            pending_end_cue: Arc::new(Mutex::new(None)),
            settings_path: None,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            event_tx,
            display_tx,
            _display_rx: display_rx,
            tick_plan_tx,
            _tick_plan_rx: tick_plan_rx,
        }
    }

    /// Remember where settings are saved
    pub fn with_settings_path(mut self, path: Option<PathBuf>) -> Self {
        self.settings_path = path;
        self
    }

    /// Subscribe to scheduler events
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    fn publish(&self, event: TimerEvent) {
        if let Err(e) = self.event_tx.send(event) {
            debug!("No event subscribers: {}", e);
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Apply a timer update, then publish the fired cue (if any), the new
    /// display frame and the tick plan, in that order.
    fn update_timer<F>(&self, action: Option<&str>, updater: F) -> Result<DisplayFrame, String>
    where
        F: FnOnce(&mut TimerState) -> Option<CueFired>,
    {
        let mut timer = lock(&self.timer_state, "timer state")?;
        let fired = updater(&mut *timer);

        if let Some(cue) = fired {
            info!("Cue fired: {:?}", cue);
            self.publish(cue.into());
        }

        let frame = {
            let display = lock(&self.display_state, "display state")?;
            DisplayFrame::compose(&timer, &display)
        };
        self.publish(TimerEvent::Display { frame: frame.clone() });
        self.display_tx.send_replace(frame.clone());

        // Published under the timer lock so concurrent updates cannot reorder plans
        let (second, blink) = (timer.second_tick_active(), timer.blink_tick_active());
        self.tick_plan_tx
            .send_if_modified(|plan| plan.set_timer(second, blink));
        drop(timer);

        if let Some(action) = action {
            self.record_action(action);
        }
        Ok(frame)
    }

    /// Start the countdown
    pub fn start_timer(&self) -> Result<DisplayFrame, String> {
        self.update_timer(Some("start"), |timer| {
            if timer.start() {
                info!("Timer started at {}", timer.time_string());
            }
            None
        })
    }

    /// Pause the countdown
    pub fn pause_timer(&self) -> Result<DisplayFrame, String> {
        self.update_timer(Some("pause"), |timer| {
            if timer.pause() {
                info!("Timer paused at {}", timer.time_string());
            }
            None
        })
    }

    /// Resume a paused countdown
    pub fn resume_timer(&self) -> Result<DisplayFrame, String> {
        self.update_timer(Some("resume"), |timer| {
            if timer.resume() {
                info!("Timer resumed at {}", timer.time_string());
            }
            None
        })
    }

    /// Stop and reset to the default total
    pub fn stop_timer(&self) -> Result<DisplayFrame, String> {
        self.update_timer(Some("stop"), |timer| {
            timer.stop();
            info!("Timer stopped and reset to {}", timer.time_string());
            None
        })
    }

    /// Single start/pause button: start, or resume if paused, or pause
    pub fn toggle_timer(&self) -> Result<DisplayFrame, String> {
        self.update_timer(Some("toggle"), |timer| {
            if !timer.is_running() {
                timer.start();
                info!("Timer started at {}", timer.time_string());
            } else if timer.is_paused() {
                timer.resume();
                info!("Timer resumed at {}", timer.time_string());
            } else {
                timer.pause();
                info!("Timer paused at {}", timer.time_string());
            }
            None
        })
    }

    /// Set the remaining time
    pub fn set_total(&self, hours: u64, minutes: u64, seconds: u64) -> Result<DisplayFrame, String> {
        self.update_timer(Some("set-total"), |timer| {
            timer.set_total(hours, minutes, seconds);
            info!("Remaining time set to {}", timer.time_string());
            None
        })
    }

    /// Extend (positive) or reduce (negative) the remaining time
    pub fn adjust_time(&self, delta_minutes: i64) -> Result<DisplayFrame, String> {
        self.update_timer(Some("adjust"), |timer| {
            timer.adjust(delta_minutes);
            info!("Adjusted time by {} min, now {}", delta_minutes, timer.time_string());
            None
        })
    }

    /// Update the red and/or blink effect thresholds
    pub fn set_effects(&self, red_start: Option<u64>, blink_start: Option<u64>) -> Result<DisplayFrame, String> {
        self.update_timer(Some("effects"), |timer| {
            if let Some(seconds) = red_start {
                info!("Red effect starts at {}s", seconds);
                timer.set_red_effect_start(seconds);
            }
            if let Some(seconds) = blink_start {
                info!("Blink effect starts at {}s", seconds);
                timer.set_blink_effect_start(seconds);
            }
            None
        })
    }

    /// Mute or unmute the countdown cues
    pub fn set_muted(&self, muted: bool) -> Result<(), String> {
        let mut timer = lock(&self.timer_state, "timer state")?;
        timer.set_muted(muted);
        drop(timer);

        info!("Cues {}", if muted { "muted" } else { "unmuted" });
        self.record_action(if muted { "mute" } else { "unmute" });
        Ok(())
    }

    /// Bind or clear a cue; returns the full cue table
    pub fn register_cue(&self, threshold: u64, path: Option<String>) -> Result<BTreeMap<u64, String>, String> {
        let mut timer = lock(&self.timer_state, "timer state")?;
        match &path {
            Some(path) => info!("Cue at {}s -> {}", threshold, path),
            None => info!("Cue at {}s cleared", threshold),
        }
        timer.register_cue(threshold, path);
        let cues = timer.cues().clone();
        drop(timer);

        self.record_action("cue");
        Ok(cues)
    }

    /// Current cue table
    pub fn get_cues(&self) -> Result<BTreeMap<u64, String>, String> {
        lock(&self.timer_state, "timer state").map(|timer| timer.cues().clone())
    }

    /// Play the sound bound to `threshold` now. Returns false if nothing is bound.
    pub fn preview_cue(&self, threshold: u64) -> Result<bool, String> {
        let cue = lock(&self.timer_state, "timer state")?.preview_cue(threshold);
        match cue {
            Some(cue) => {
                debug!("Previewing cue at {}s", threshold);
                self.publish(cue.into());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// One-second tick from the ticker task. Ignored unless the countdown runs.
    pub fn second_tick(&self) -> Result<(), String> {
        let running = lock(&self.timer_state, "timer state")?.second_tick_active();
        if !running {
            debug!("Dropping second tick for an idle timer");
            return Ok(());
        }
        self.update_timer(None, |timer| timer.on_second_tick())
            .map(|_| ())
    }

    /// Blink tick from the ticker task
    pub fn blink_tick(&self) -> Result<(), String> {
        let blinking = lock(&self.timer_state, "timer state")?.blink_tick_active();
        if !blinking {
            return Ok(());
        }
        self.update_timer(None, |timer| {
            timer.on_blink_tick();
            None
        })
        .map(|_| ())
    }

    /// Set the title of the player-facing display
    pub fn set_title(&self, title: String) -> Result<DisplayFrame, String> {
        info!("Display title set to {:?}", title);
        lock(&self.display_state, "display state")?.title = title;
        self.update_timer(Some("title"), |_| None)
    }

    /// Set the background of the player-facing display
    pub fn set_background(&self, background: Rgb) -> Result<DisplayFrame, String> {
        let mut screen = lock(&self.display_state, "display state")?;
        screen.set_background(background);
        info!("Display background {} with {} text", background, screen.text_color);
        drop(screen);

        self.update_timer(Some("background"), |_| None)
    }

    /// Switch the overlay screen. `custom` replaces the custom image when given.
    /// Without an overlay the break timer is hidden.
    pub fn set_overlay(&self, overlay: Overlay, custom: Option<String>) -> Result<DisplayFrame, String> {
        let mut screen = lock(&self.display_state, "display state")?;
        if custom.is_some() {
            screen.custom_overlay = custom;
        }
        screen.overlay = overlay;
        info!("Overlay set to {}", overlay);
        drop(screen);

        if overlay == Overlay::None {
            let enabled = lock(&self.break_timer, "break timer")?.enabled;
            if enabled {
                self.update_break(None, |timer| {
                    let total = timer.total_seconds;
                    timer.configure(false, total);
                })?;
            }
        }
        self.update_timer(Some("overlay"), |_| None)
    }

    /// Latest display frame
    pub fn current_frame(&self) -> DisplayFrame {
        self.display_tx.borrow().clone()
    }

    fn update_break<F>(&self, action: Option<&str>, updater: F) -> Result<BreakFrame, String>
    where
        F: FnOnce(&mut BreakTimer),
    {
        let mut timer = lock(&self.break_timer, "break timer")?;
        updater(&mut *timer);
        let frame = BreakFrame::from(&*timer);
        let running = timer.running;
        self.publish(TimerEvent::Break { frame: frame.clone() });
        self.tick_plan_tx.send_if_modified(|plan| plan.set_break(running));
        drop(timer);

        if let Some(action) = action {
            self.record_action(action);
        }
        Ok(frame)
    }

    /// Show or hide the break timer and set its length
    pub fn configure_break(&self, enabled: bool, total_seconds: u64) -> Result<BreakFrame, String> {
        info!("Break timer {} ({}s)", if enabled { "enabled" } else { "disabled" }, total_seconds);
        self.update_break(Some("break"), |timer| timer.configure(enabled, total_seconds))
    }

    /// Play, pause or stop the break timer
    pub fn control_break(&self, action: BreakAction) -> Result<BreakFrame, String> {
        info!("Break timer action: {:?}", action);
        self.update_break(Some("break"), |timer| {
            timer.apply(action);
        })
    }

    /// One-second tick of the break timer
    pub fn break_tick(&self) -> Result<(), String> {
        self.update_break(None, BreakTimer::tick).map(|_| ())
    }

    /// Current break timer state
    pub fn get_break_timer(&self) -> Result<BreakTimer, String> {
        lock(&self.break_timer, "break timer").map(|timer| timer.clone())
    }

    /// Park the end cue until someone answers the confirmation
    pub fn hold_end_cue(&self, path: String) -> Result<(), String> {
        let mut pending = lock(&self.pending_end_cue, "pending end cue")?;
        if let Some(previous) = pending.replace(path) {
            warn!("Replacing unanswered end cue {}", previous);
        }
        Ok(())
    }

    /// Answer the end-cue confirmation. Returns the cue that was pending.
    pub fn resolve_end_cue(&self, play: bool) -> Result<Option<String>, String> {
        let pending = lock(&self.pending_end_cue, "pending end cue")?.take();
        match &pending {
            Some(path) if play => {
                info!("End cue confirmed: {}", path);
                self.publish(TimerEvent::PlaySound { path: path.clone() });
            }
            Some(path) => info!("End cue declined: {}", path),
            None => debug!("No end cue waiting for confirmation"),
        }
        self.record_action(if play { "confirm-end" } else { "decline-end" });
        Ok(pending)
    }

    pub fn get_pending_end_cue(&self) -> Result<Option<String>, String> {
        lock(&self.pending_end_cue, "pending end cue").map(|pending| pending.clone())
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerState, String> {
        lock(&self.timer_state, "timer state").map(|timer| timer.clone())
    }

    /// Settings reflecting the current timer configuration
    pub fn current_settings(&self) -> Result<TimerSettings, String> {
        let timer = lock(&self.timer_state, "timer state")?;
        Ok(TimerSettings {
            default_total_seconds: timer.default_total_seconds(),
            red_effect_start_seconds: timer.red_effect_start_seconds(),
            blink_effect_start_seconds: timer.blink_effect_start_seconds(),
            cues: timer.cues().clone(),
        })
    }

    /// Persist the current settings to `settings_path`
    pub fn save_settings(&self) -> Result<PathBuf, String> {
        let path = self
            .settings_path
            .clone()
            .ok_or_else(|| "No settings file configured".to_string())?;
        self.current_settings()?
            .save(&path)
            .map_err(|e| e.to_string())?;
        self.record_action("save-settings");
        Ok(path)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
