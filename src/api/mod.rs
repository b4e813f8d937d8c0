//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/resume", post(resume_handler))
        .route("/timer/stop", post(stop_handler))
        .route("/timer/toggle", post(toggle_handler))
        .route("/timer/total", post(set_total_handler))
        .route("/timer/adjust", post(adjust_handler))
        .route("/timer/effects", post(effects_handler))
        .route("/timer/mute", post(mute_handler))
        .route("/timer/cues", get(cues_handler))
        .route("/timer/cues/:threshold", put(register_cue_handler))
        .route("/timer/cues/:threshold/preview", post(preview_cue_handler))
        .route("/timer/confirm-end", post(confirm_end_handler))
        .route("/display", get(display_handler))
        .route("/display/title", post(title_handler))
        .route("/display/background", post(background_handler))
        .route("/display/overlay", post(overlay_handler))
        .route("/break", post(break_config_handler))
        .route("/break/:action", post(break_control_handler))
        .route("/settings/save", post(save_settings_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
