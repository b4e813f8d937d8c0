//! Persisted timer settings and the default cue table

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::state::timer_state::{
    DEFAULT_BLINK_EFFECT_START_SECONDS, DEFAULT_RED_EFFECT_START_SECONDS, DEFAULT_TOTAL_SECONDS,
};

/// Cue labels shipped with the game, matched against `<label>.wav`
pub const DEFAULT_CUE_TABLE: [(&str, u64); 11] = [
    ("5 часов", 5 * 3600),
    ("4 часа", 4 * 3600),
    ("3 часа", 3 * 3600),
    ("2 часа", 2 * 3600),
    ("1 час", 3600),
    ("30 минут", 1800),
    ("15 минут", 900),
    ("10 минут", 600),
    ("5 минут", 300),
    ("1 минута", 60),
    ("Конец", 0),
];

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Same fields as `TimerSettings`, each optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    default_total_seconds: Option<u64>,
    red_effect_start_seconds: Option<u64>,
    blink_effect_start_seconds: Option<u64>,
    cues: Option<BTreeMap<u64, String>>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SettingsError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No settings file at {}", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn replace_logged(current: &mut u64, saved: Option<u64>, what: &str, path: &Path) {
    if let Some(saved) = saved {
        if saved != *current {
            warn!("Command line {} {} overridden by {} ({})", what, current, path.display(), saved);
        }
        *current = saved;
    }
}

/// Timer configuration that survives a restart. Running state is never saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    pub default_total_seconds: u64,
    pub red_effect_start_seconds: u64,
    pub blink_effect_start_seconds: u64,
    /// Threshold (remaining seconds) to sound file
    pub cues: BTreeMap<u64, String>,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            default_total_seconds: DEFAULT_TOTAL_SECONDS,
            red_effect_start_seconds: DEFAULT_RED_EFFECT_START_SECONDS,
            blink_effect_start_seconds: DEFAULT_BLINK_EFFECT_START_SECONDS,
            cues: BTreeMap::new(),
        }
    }
}

impl TimerSettings {
    /// Load settings from `path`. A missing file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>, SettingsError> {
        let settings = read_json(path)?;
        if settings.is_some() {
            info!("Loaded timer settings from {}", path.display());
        }
        Ok(settings)
    }

    /// Apply the fields present in the settings file at `path` on top of
    /// `self`. Absent fields keep their current values.
    pub fn overlay(mut self, path: &Path) -> Result<Self, SettingsError> {
        let Some(file) = read_json::<SettingsFile>(path)? else {
            return Ok(self);
        };

        replace_logged(&mut self.default_total_seconds, file.default_total_seconds, "total", path);
        replace_logged(&mut self.red_effect_start_seconds, file.red_effect_start_seconds, "red start", path);
        replace_logged(&mut self.blink_effect_start_seconds, file.blink_effect_start_seconds, "blink start", path);
        if let Some(cues) = file.cues {
            self.cues = cues;
        }

        info!("Applied timer settings from {}", path.display());
        Ok(self)
    }

    /// Write settings as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)?;

        info!("Saved timer settings to {}", path.display());
        Ok(())
    }

    /// Bind every default cue whose `<label>.wav` exists in `sounds_dir`.
    /// Cues already present are kept.
    pub fn with_default_cues(mut self, sounds_dir: &Path) -> Self {
        for (label, threshold) in DEFAULT_CUE_TABLE {
            let path = sounds_dir.join(format!("{}.wav", label));
            if path.is_file() {
                debug!("Default cue {} -> {}", threshold, path.display());
                self.cues
                    .entry(threshold)
                    .or_insert_with(|| path.to_string_lossy().into_owned());
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = TimerSettings::load(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_then_load_keeps_cues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("timer.json");

        let mut settings = TimerSettings::default();
        settings.cues.insert(0, "end.wav".into());
        settings.cues.insert(3600, "hour.wav".into());
        settings.save(&path).unwrap();

        let loaded = TimerSettings::load(&path).unwrap().unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timer.json");
        fs::write(&path, r#"{"blink_effect_start_seconds": 30}"#).unwrap();

        let loaded = TimerSettings::load(&path).unwrap().unwrap();
        assert_eq!(loaded.blink_effect_start_seconds, 30);
        assert_eq!(loaded.default_total_seconds, DEFAULT_TOTAL_SECONDS);
    }

    #[test]
    fn overlay_keeps_values_the_file_does_not_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timer.json");
        fs::write(&path, r#"{"blink_effect_start_seconds": 30}"#).unwrap();

        let base = TimerSettings {
            default_total_seconds: 5400,
            red_effect_start_seconds: 120,
            ..TimerSettings::default()
        };
        let merged = base.overlay(&path).unwrap();
        assert_eq!(merged.default_total_seconds, 5400);
        assert_eq!(merged.red_effect_start_seconds, 120);
        assert_eq!(merged.blink_effect_start_seconds, 30);
    }

    #[test]
    fn overlay_without_a_file_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let base = TimerSettings {
            default_total_seconds: 60,
            ..TimerSettings::default()
        };
        let merged = base.clone().overlay(&dir.path().join("absent.json")).unwrap();
        assert_eq!(merged, base);
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timer.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            TimerSettings::load(&path),
            Err(SettingsError::Json { .. })
        ));
    }

    #[test]
    fn default_cues_bind_existing_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1 час.wav"), b"RIFF").unwrap();
        fs::write(dir.path().join("Конец.wav"), b"RIFF").unwrap();

        let mut settings = TimerSettings::default();
        settings.cues.insert(0, "custom-end.wav".into());
        let settings = settings.with_default_cues(dir.path());

        assert_eq!(settings.cues.len(), 2);
        assert!(settings.cues[&3600].ends_with("1 час.wav"));
        assert_eq!(settings.cues[&0], "custom-end.wav");
    }
}
