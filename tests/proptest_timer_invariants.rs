//! Property-based invariants of the countdown scheduler.
//!
//! 1. Red ratio stays within 0..=1, is 0 above the effect start and 1 at zero.
//! 2. Extending then reducing by the same amount is a no-op.
//! 3. `stop()` always restores the default total and forgets fired cues.
//! 4. The blink tick is active exactly when running, unpaused and in range
//!    (checked wherever blink is re-evaluated).
//! 5. A cue fires at most once per pass through its threshold.
//! 6. Ticks delivered to a stopped or paused timer change nothing.

use konstruktor_timer::state::{CueFired, TimerState};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Start,
    Pause,
    Resume,
    Tick,
    Adjust(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Start),
        1 => Just(Op::Pause),
        1 => Just(Op::Resume),
        6 => Just(Op::Tick),
        1 => (-3i64..=3).prop_map(Op::Adjust),
    ]
}

fn apply(timer: &mut TimerState, op: &Op) -> Option<CueFired> {
    match op {
        Op::Start => {
            timer.start();
            None
        }
        Op::Pause => {
            timer.pause();
            None
        }
        Op::Resume => {
            timer.resume();
            None
        }
        Op::Tick => timer.on_second_tick(),
        Op::Adjust(minutes) => {
            timer.adjust(*minutes);
            None
        }
    }
}

proptest! {
    #[test]
    fn red_ratio_bounds(remaining in 0u64..20_000, red_start in 0u64..20_000) {
        let mut timer = TimerState::new(remaining);
        timer.set_red_effect_start(red_start);
        let ratio = timer.red_ratio();

        prop_assert!((0.0..=1.0).contains(&ratio));
        if remaining > red_start || red_start == 0 {
            prop_assert_eq!(ratio, 0.0);
        }
        if remaining == 0 && red_start > 0 {
            prop_assert_eq!(ratio, 1.0);
        }
    }

    #[test]
    fn extend_then_reduce_restores_time(remaining in 0u64..50_000, minutes in 0i64..600) {
        let mut timer = TimerState::new(remaining);
        timer.adjust(minutes);
        timer.adjust(-minutes);
        prop_assert_eq!(timer.remaining_seconds(), remaining);
        prop_assert_eq!(timer.last_fired_threshold(), None);
    }

    #[test]
    fn stop_always_resets(total in 0u64..1_000, ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut timer = TimerState::new(total);
        timer.register_cue(total / 2, Some("mid.wav".into()));
        for op in &ops {
            apply(&mut timer, op);
        }
        timer.stop();

        prop_assert_eq!(timer.remaining_seconds(), total);
        prop_assert_eq!(timer.last_fired_threshold(), None);
        prop_assert!(!timer.is_running());
        prop_assert!(!timer.is_paused());
        prop_assert!(timer.blink_visible());
        prop_assert!(!timer.blink_tick_active());
    }

    #[test]
    fn blink_tick_matches_run_state(
        total in 0u64..40,
        blink_start in 0u64..30,
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let mut timer = TimerState::new(total);
        timer.set_blink_effect_start(blink_start);
        for op in &ops {
            let was_active = timer.second_tick_active();
            apply(&mut timer, op);
            // Blink is re-evaluated on ticks and on run-state transitions only;
            // adjustments take effect on the next tick
            let reevaluated = match op {
                Op::Tick => was_active,
                Op::Start | Op::Pause | Op::Resume => was_active != timer.second_tick_active(),
                Op::Adjust(_) => false,
            };
            if reevaluated {
                let expected = timer.second_tick_active() && timer.remaining_seconds() <= blink_start;
                prop_assert_eq!(timer.blink_tick_active(), expected, "after {:?}", op);
            }
        }
    }

    #[test]
    fn cue_fires_once_without_adjustments(
        total in 1u64..30,
        ops in prop::collection::vec(
            prop_oneof![1 => Just(Op::Pause), 1 => Just(Op::Resume), 6 => Just(Op::Tick)],
            0..120,
        ),
    ) {
        let threshold = total / 2 + 1;
        let mut timer = TimerState::new(total);
        timer.register_cue(threshold, Some("cue.wav".into()));
        timer.start();

        let fired = ops
            .iter()
            .filter_map(|op| apply(&mut timer, op))
            .count();
        prop_assert!(fired <= 1);
        if timer.remaining_seconds() < threshold {
            prop_assert_eq!(fired, 1);
        }
    }

    #[test]
    fn idle_ticks_change_nothing(
        total in 0u64..100,
        ops in prop::collection::vec(op_strategy(), 0..40),
        stray in 1usize..5,
    ) {
        let mut timer = TimerState::new(total);
        timer.register_cue(total, Some("top.wav".into()));
        for op in &ops {
            apply(&mut timer, op);
        }
        if timer.is_running() && !timer.is_paused() {
            timer.pause();
        }

        let before = timer.snapshot();
        for _ in 0..stray {
            prop_assert_eq!(timer.on_second_tick(), None);
        }
        prop_assert_eq!(timer.snapshot(), before);
    }
}
