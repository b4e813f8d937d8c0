//! API request and response structures

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{timer_state::TimerSnapshot, BreakTimer, DisplayFrame};

/// API response structure for timer commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub display: DisplayFrame,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, display: DisplayFrame) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            display,
        }
    }

    /// Create an ok response
    pub fn ok(message: impl Into<String>, display: DisplayFrame) -> Self {
        Self::new("ok".to_string(), message.into(), display)
    }
}

/// Full status of the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub display: DisplayFrame,
    pub break_timer: BreakTimer,
    pub pending_end_cue: Option<String>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Cue table response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuesResponse {
    pub cues: BTreeMap<u64, String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetTotalRequest {
    #[serde(default)]
    pub hours: u64,
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjustRequest {
    pub minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EffectsRequest {
    pub red_start_seconds: Option<u64>,
    pub blink_start_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MuteRequest {
    pub muted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CueRequest {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmEndRequest {
    pub play: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmEndResponse {
    pub played: bool,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackgroundRequest {
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverlayRequest {
    pub overlay: String,
    pub custom_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BreakConfigRequest {
    pub enabled: bool,
    pub total_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSavedResponse {
    pub path: String,
}
