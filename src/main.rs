//! Konstruktor Timer - countdown service for live game sessions
//!
//! This is the main entry point for the konstruktor-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use konstruktor_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    services::AudioPlayer,
    tasks::{countdown_ticker_task, cue_dispatch_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("konstruktor_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting konstruktor-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, total={}min, red={}s, blink={}s",
          config.host, config.port, config.total, config.red_start, config.blink_start);

    // Command line first, then the settings file, then default cue files for unbound thresholds
    let mut settings = config.base_settings();
    if let Some(path) = &config.settings {
        settings = settings.overlay(path)?;
    }
    if let Some(dir) = &config.sounds_dir {
        settings = settings.with_default_cues(dir);
    }
    info!("{} cue(s) bound", settings.cues.len());

    // Playback problems are never fatal
    let player = AudioPlayer::new();

    // Create application state
    let state = Arc::new(
        AppState::new(config.port, config.host.clone(), settings)
            .with_settings_path(config.settings.clone()),
    );

    // Start the background tasks
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_ticker_task(ticker_state).await;
    });

    let dispatch_state = Arc::clone(&state);
    let auto_confirm = config.auto_confirm;
    tokio::spawn(async move {
        cue_dispatch_task(dispatch_state, player, auto_confirm).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/{{start,pause,resume,stop,toggle}} - Countdown lifecycle");
    info!("  POST /timer/total, /timer/adjust         - Change remaining time");
    info!("  POST /timer/effects, /timer/mute         - Effects and cue muting");
    info!("  GET  /timer/cues, PUT /timer/cues/:secs   - Cue bindings");
    info!("  POST /timer/confirm-end                  - Answer the end-of-time prompt");
    info!("  GET  /display, GET /events               - Player-facing display feed");
    info!("  POST /display/{{title,background,overlay}}  - Display appearance");
    info!("  POST /break, /break/:action              - Break timer");
    info!("  GET  /status                             - Full status");
    info!("  GET  /health                             - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
