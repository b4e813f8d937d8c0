//! Cue dispatch background task

use std::{path::Path, sync::Arc};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::{
    services::AudioPlayer,
    state::{AppState, TimerEvent},
};

/// Background task that turns cue events into sound playback.
///
/// The end-of-time cue is held until confirmed over the API, unless
/// `auto_confirm` is set.
pub async fn cue_dispatch_task(state: Arc<AppState>, player: AudioPlayer, auto_confirm: bool) {
    info!("Starting cue dispatch task (auto_confirm={})", auto_confirm);

    let mut events = state.subscribe();

    loop {
        match events.recv().await {
            Ok(TimerEvent::PlaySound { path }) => play(&player, &path),
            Ok(TimerEvent::ConfirmEnd { path }) => {
                if auto_confirm {
                    info!("Time is up, playing end cue without confirmation");
                    play(&player, &path);
                } else {
                    info!("Time is up, end cue waiting for confirmation: {}", path);
                    if let Err(e) = state.hold_end_cue(path) {
                        error!("Failed to hold end cue: {}", e);
                    }
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("Cue dispatcher lagged, {} events skipped", skipped);
            }
            Err(RecvError::Closed) => {
                debug!("Event channel closed, stopping cue dispatcher");
                break;
            }
        }
    }
}

fn play(player: &AudioPlayer, path: &str) {
    // Playback problems never stop the countdown
    if let Err(e) = player.play(Path::new(path)) {
        warn!("Skipping sound: {}", e);
    }
}
