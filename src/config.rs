//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::settings::TimerSettings;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "konstruktor-timer")]
#[command(about = "Countdown timer service with sound cues and visual effects")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Default countdown total in minutes
    #[arg(short, long, default_value = "300")]
    pub total: u64,

    /// Remaining seconds at which the red effect starts
    #[arg(long, default_value = "600")]
    pub red_start: u64,

    /// Remaining seconds at which the time starts blinking
    #[arg(long, default_value = "10")]
    pub blink_start: u64,

    /// Directory with the default cue sounds ("1 час.wav", "Конец.wav", ...)
    #[arg(long)]
    pub sounds_dir: Option<PathBuf>,

    /// JSON file holding timer settings and cue bindings
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Play the end-of-time cue without waiting for confirmation
    #[arg(long)]
    pub auto_confirm: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Timer settings implied by the command line alone
    pub fn base_settings(&self) -> TimerSettings {
        TimerSettings {
            default_total_seconds: self.total.saturating_mul(60),
            red_effect_start_seconds: self.red_start,
            blink_effect_start_seconds: self.blink_start,
            cues: Default::default(),
        }
    }
}
