//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::{
    state::{
        break_timer::DEFAULT_BREAK_SECONDS, AppState, BreakAction, BreakTimer, DisplayFrame,
        Overlay,
    },
    utils::color::Rgb,
};
use super::responses::{
    AdjustRequest, ApiResponse, BackgroundRequest, BreakConfigRequest, ConfirmEndRequest,
    ConfirmEndResponse, CueRequest, CuesResponse, EffectsRequest, HealthResponse, MuteRequest,
    OverlayRequest, SetTotalRequest, SettingsSavedResponse, StatusResponse, TitleRequest,
};

type ApiResult<T> = Result<Json<T>, StatusCode>;

/// Wrap a state update into an API response, logging failures
fn respond(result: Result<DisplayFrame, String>, message: &str) -> ApiResult<ApiResponse> {
    match result {
        Ok(frame) => {
            info!("{}", message);
            Ok(Json(ApiResponse::ok(message, frame)))
        }
        Err(e) => {
            error!("Failed to apply \"{}\": {}", message, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn internal_error(context: &str) -> impl FnOnce(String) -> StatusCode + '_ {
    move |e| {
        error!("{}: {}", context, e);
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    respond(state.start_timer(), "Timer started")
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    respond(state.pause_timer(), "Timer paused")
}

/// Handle POST /timer/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    respond(state.resume_timer(), "Timer resumed")
}

/// Handle POST /timer/stop
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    respond(state.stop_timer(), "Timer stopped")
}

/// Handle POST /timer/toggle - the start/pause/resume button
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    respond(state.toggle_timer(), "Timer toggled")
}

/// Handle POST /timer/total
pub async fn set_total_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetTotalRequest>,
) -> ApiResult<ApiResponse> {
    respond(
        state.set_total(request.hours, request.minutes, request.seconds),
        "Remaining time set",
    )
}

/// Handle POST /timer/adjust
pub async fn adjust_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdjustRequest>,
) -> ApiResult<ApiResponse> {
    respond(state.adjust_time(request.minutes), "Remaining time adjusted")
}

/// Handle POST /timer/effects
pub async fn effects_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EffectsRequest>,
) -> ApiResult<ApiResponse> {
    respond(
        state.set_effects(request.red_start_seconds, request.blink_start_seconds),
        "Effects updated",
    )
}

/// Handle POST /timer/mute
pub async fn mute_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MuteRequest>,
) -> ApiResult<ApiResponse> {
    state
        .set_muted(request.muted)
        .map_err(internal_error("Failed to change mute"))?;
    let message = if request.muted { "Cues muted" } else { "Cues unmuted" };
    Ok(Json(ApiResponse::ok(message, state.current_frame())))
}

/// Handle GET /timer/cues
pub async fn cues_handler(State(state): State<Arc<AppState>>) -> ApiResult<CuesResponse> {
    let cues = state
        .get_cues()
        .map_err(internal_error("Failed to read cues"))?;
    Ok(Json(CuesResponse { cues }))
}

/// Handle PUT /timer/cues/:threshold - a null path clears the cue
pub async fn register_cue_handler(
    State(state): State<Arc<AppState>>,
    Path(threshold): Path<u64>,
    Json(request): Json<CueRequest>,
) -> ApiResult<CuesResponse> {
    let cues = state
        .register_cue(threshold, request.path)
        .map_err(internal_error("Failed to register cue"))?;
    Ok(Json(CuesResponse { cues }))
}

/// Handle POST /timer/cues/:threshold/preview
pub async fn preview_cue_handler(
    State(state): State<Arc<AppState>>,
    Path(threshold): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    match state.preview_cue(threshold) {
        Ok(true) => Ok(StatusCode::ACCEPTED),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to preview cue at {}s: {}", threshold, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/confirm-end - answer the "time is up" prompt
pub async fn confirm_end_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfirmEndRequest>,
) -> ApiResult<ConfirmEndResponse> {
    let path = state
        .resolve_end_cue(request.play)
        .map_err(internal_error("Failed to resolve end cue"))?;
    Ok(Json(ConfirmEndResponse {
        played: request.play && path.is_some(),
        path,
    }))
}

/// Handle GET /display - latest frame for the player-facing window
pub async fn display_handler(State(state): State<Arc<AppState>>) -> Json<DisplayFrame> {
    Json(state.current_frame())
}

/// Handle POST /display/title
pub async fn title_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TitleRequest>,
) -> ApiResult<ApiResponse> {
    respond(state.set_title(request.title), "Title updated")
}

/// Handle POST /display/background
pub async fn background_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BackgroundRequest>,
) -> ApiResult<ApiResponse> {
    let color = match Rgb::parse(&request.color) {
        Ok(color) => color,
        Err(e) => {
            warn!("Ignoring background change: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    respond(state.set_background(color), "Background updated")
}

/// Handle POST /display/overlay - none, black, cube, constructor or custom
pub async fn overlay_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OverlayRequest>,
) -> ApiResult<ApiResponse> {
    let overlay: Overlay = match request.overlay.parse() {
        Ok(overlay) => overlay,
        Err(e) => {
            warn!("{}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    respond(state.set_overlay(overlay, request.custom_path), "Overlay updated")
}

/// Handle POST /break - enable/disable and set the break length
pub async fn break_config_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BreakConfigRequest>,
) -> ApiResult<BreakTimer> {
    let total = request.total_seconds.unwrap_or(DEFAULT_BREAK_SECONDS);
    state
        .configure_break(request.enabled, total)
        .map_err(internal_error("Failed to configure break timer"))?;
    let timer = state
        .get_break_timer()
        .map_err(internal_error("Failed to read break timer"))?;
    Ok(Json(timer))
}

/// Handle POST /break/:action - play, pause or stop
pub async fn break_control_handler(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
) -> ApiResult<BreakTimer> {
    let action: BreakAction = match action.parse() {
        Ok(action) => action,
        Err(e) => {
            warn!("{}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    state
        .control_break(action)
        .map_err(internal_error("Failed to control break timer"))?;
    let timer = state
        .get_break_timer()
        .map_err(internal_error("Failed to read break timer"))?;
    Ok(Json(timer))
}

/// Handle POST /settings/save
pub async fn save_settings_handler(State(state): State<Arc<AppState>>) -> ApiResult<SettingsSavedResponse> {
    if state.settings_path.is_none() {
        warn!("Settings save requested but no settings file is configured");
        return Err(StatusCode::CONFLICT);
    }
    let path = state
        .save_settings()
        .map_err(internal_error("Failed to save settings"))?;
    Ok(Json(SettingsSavedResponse {
        path: path.display().to_string(),
    }))
}

/// Handle GET /events - server-sent stream of every scheduler event
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let events = stream::unfold(state.subscribe(), |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let sse = Event::default().event(event.kind()).json_data(&event);
                    return Some((sse, rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream client lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return the full service status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let timer = state
        .get_timer_state()
        .map_err(internal_error("Failed to get timer state"))?;
    let break_timer = state
        .get_break_timer()
        .map_err(internal_error("Failed to get break timer"))?;
    let pending_end_cue = state
        .get_pending_end_cue()
        .map_err(internal_error("Failed to get pending end cue"))?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer: timer.snapshot(),
        display: state.current_frame(),
        break_timer,
        pending_end_cue,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
