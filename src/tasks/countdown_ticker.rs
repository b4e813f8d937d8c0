//! Countdown ticker background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::state::{AppState, TickPlan};

/// Main countdown and break timer period
pub const SECOND_TICK: Duration = Duration::from_secs(1);
/// Blink toggle period
pub const BLINK_TICK: Duration = Duration::from_millis(500);

/// Interval whose first tick lands one full period from now
fn restarted(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Restart `interval` when its slot moves to a new generation
fn follow(slot: &str, current: Option<u64>, next: Option<u64>, interval: &mut Interval, period: Duration) {
    if next != current {
        if next.is_some() {
            *interval = restarted(period);
        }
        debug!("{} tick {:?} -> {:?}", slot, current, next);
    }
}

/// Background task that drives the one-second, blink and break ticks
/// according to the tick plan published by the state
pub async fn countdown_ticker_task(state: Arc<AppState>) {
    info!("Starting countdown ticker task");

    let mut plan_rx = state.tick_plan_tx.subscribe();
    let mut plan = TickPlan::default();
    let mut second = restarted(SECOND_TICK);
    let mut blink = restarted(BLINK_TICK);
    let mut break_tick = restarted(SECOND_TICK);

    // Pick up whatever was planned before the task started
    plan_rx.mark_changed();

    loop {
        // Plan changes are applied before any pending tick
        tokio::select! {
            biased;

            changed = plan_rx.changed() => {
                if changed.is_err() {
                    warn!("Tick plan channel closed, stopping ticker");
                    break;
                }
                let next = *plan_rx.borrow_and_update();
                follow("second", plan.second, next.second, &mut second, SECOND_TICK);
                follow("blink", plan.blink, next.blink, &mut blink, BLINK_TICK);
                follow("break", plan.break_tick, next.break_tick, &mut break_tick, SECOND_TICK);
                plan = next;
            }

            _ = second.tick(), if plan.second.is_some() => {
                if let Err(e) = state.second_tick() {
                    error!("Failed to apply second tick: {}", e);
                }
            }

            _ = blink.tick(), if plan.blink.is_some() => {
                if let Err(e) = state.blink_tick() {
                    error!("Failed to apply blink tick: {}", e);
                }
            }

            _ = break_tick.tick(), if plan.break_tick.is_some() => {
                if let Err(e) = state.break_tick() {
                    error!("Failed to apply break tick: {}", e);
                }
            }
        }
    }
}
