//! HTTP API exercised through the router without binding a socket

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use konstruktor_timer::{api::create_router, settings::TimerSettings, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(total: u64) -> (Arc<AppState>, Router) {
    let settings = TimerSettings {
        default_total_seconds: total,
        ..TimerSettings::default()
    };
    let state = Arc::new(AppState::new(20554, "127.0.0.1".into(), settings));
    let router = create_router(Arc::clone(&state));
    (state, router)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let (_, router) = app(60);
    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn set_total_and_adjust_update_the_display() {
    let (_, router) = app(60);

    let (status, body) = send(
        &router,
        "POST",
        "/timer/total",
        Some(json!({"hours": 1, "minutes": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display"]["time"], "01:30:00");

    let (_, body) = send(&router, "POST", "/timer/adjust", Some(json!({"minutes": -100}))).await;
    assert_eq!(body["display"]["remaining_seconds"], 0);
    assert_eq!(body["display"]["red_ratio"], 1.0);
}

#[tokio::test]
async fn lifecycle_is_reflected_in_status() {
    let (_, router) = app(60);

    send(&router, "POST", "/timer/start", None).await;
    let (_, status) = send(&router, "GET", "/status", None).await;
    assert_eq!(status["timer"]["running"], true);
    assert_eq!(status["timer"]["paused"], false);
    assert_eq!(status["last_action"], "start");

    send(&router, "POST", "/timer/toggle", None).await;
    let (_, status) = send(&router, "GET", "/status", None).await;
    assert_eq!(status["timer"]["paused"], true);

    send(&router, "POST", "/timer/stop", None).await;
    let (_, status) = send(&router, "GET", "/status", None).await;
    assert_eq!(status["timer"]["running"], false);
    assert_eq!(status["timer"]["remaining_seconds"], 60);
}

#[tokio::test]
async fn cues_can_be_bound_previewed_and_cleared() {
    let (state, router) = app(60);
    let mut rx = state.subscribe();

    let (status, body) = send(&router, "PUT", "/timer/cues/30", Some(json!({"path": "half.wav"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cues"]["30"], "half.wav");

    let (status, _) = send(&router, "POST", "/timer/cues/30/preview", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(
        rx.try_recv().unwrap(),
        konstruktor_timer::state::TimerEvent::PlaySound { path: "half.wav".into() }
    );

    let (_, body) = send(&router, "PUT", "/timer/cues/30", Some(json!({"path": null}))).await;
    assert_eq!(body["cues"], json!({}));

    let (status, _) = send(&router, "POST", "/timer/cues/30/preview", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_leaves_state_unchanged() {
    let (_, router) = app(60);

    let (status, _) = send(&router, "POST", "/display/background", Some(json!({"color": "teal-ish"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, "POST", "/timer/adjust", Some(json!({"minutes": "five"}))).await;
    assert!(status.is_client_error());

    let (status, _) = send(&router, "POST", "/break/rewind", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, display) = send(&router, "GET", "/display", None).await;
    assert_eq!(display["background"], "#000000");
    assert_eq!(display["time"], "00:01:00");
}

#[tokio::test]
async fn display_follows_title_and_background() {
    // Above the red effect start, so text keeps its plain contrast color
    let (_, router) = app(3600);

    send(&router, "POST", "/display/title", Some(json!({"title": "ПЕРЕРЫВ"}))).await;
    let (status, body) = send(&router, "POST", "/display/background", Some(json!({"color": "#ffffff"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display"]["title"], "ПЕРЕРЫВ");
    assert_eq!(body["display"]["title_color"], "#000000");
}

#[tokio::test]
async fn overlay_mode_reaches_the_display() {
    let (_, router) = app(60);

    let (status, body) = send(
        &router,
        "POST",
        "/display/overlay",
        Some(json!({"overlay": "custom", "custom_path": "cover.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display"]["overlay"], "custom");
    assert_eq!(body["display"]["overlay_image"], "cover.png");

    let (status, _) = send(&router, "POST", "/display/overlay", Some(json!({"overlay": "video"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, display) = send(&router, "GET", "/display", None).await;
    assert_eq!(display["overlay"], "custom");
}

#[tokio::test]
async fn end_cue_confirmation_round_trip() {
    let (state, router) = app(60);

    let (_, body) = send(&router, "POST", "/timer/confirm-end", Some(json!({"play": true}))).await;
    assert_eq!(body["played"], false);
    assert_eq!(body["path"], Value::Null);

    state.hold_end_cue("end.wav".into()).unwrap();
    let (_, status) = send(&router, "GET", "/status", None).await;
    assert_eq!(status["pending_end_cue"], "end.wav");

    let (_, body) = send(&router, "POST", "/timer/confirm-end", Some(json!({"play": true}))).await;
    assert_eq!(body["played"], true);
    assert_eq!(body["path"], "end.wav");
}

#[tokio::test]
async fn break_timer_endpoints() {
    let (_, router) = app(60);

    let (status, body) = send(&router, "POST", "/break", Some(json!({"enabled": true}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_seconds"], 600);
    assert_eq!(body["enabled"], true);

    let (_, body) = send(&router, "POST", "/break/play", None).await;
    assert_eq!(body["running"], true);

    let (_, body) = send(&router, "POST", "/break/stop", None).await;
    assert_eq!(body["running"], false);
    assert_eq!(body["current_seconds"], 600);
}

#[tokio::test]
async fn saving_settings_needs_a_configured_file() {
    let (_, router) = app(60);
    let (status, _) = send(&router, "POST", "/settings/save", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timer.json");
    let state = Arc::new(
        AppState::new(0, "127.0.0.1".into(), TimerSettings::default()).with_settings_path(Some(path.clone())),
    );
    let router = create_router(state);

    send(&router, "POST", "/timer/effects", Some(json!({"blink_start_seconds": 30}))).await;
    let (status, _) = send(&router, "POST", "/settings/save", None).await;
    assert_eq!(status, StatusCode::OK);

    let saved = TimerSettings::load(&path).unwrap().unwrap();
    assert_eq!(saved.blink_effect_start_seconds, 30);
}
