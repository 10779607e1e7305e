//! Persisted editor preferences.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global editor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Preview rendering preferences.
    pub preview: PreviewPrefs,

    /// Default recording compositor rates.
    pub recording: RecordingDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Preview rendering preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewPrefs {
    /// Render-scale multiplier applied to the preview surface dimensions.
    /// Read at startup, written whenever the user changes it.
    pub render_scale: f64,
}

/// Default rate caps for the recording compositor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingDefaults {
    /// Screen redraw rate (establishes the background every tick).
    pub screen_fps: u32,

    /// Camera frame-grab rate, deliberately lower than the screen rate
    /// to avoid capture-driver buffer exhaustion on constrained devices.
    pub camera_fps: u32,

    /// Audio sample rate.
    pub audio_sample_rate: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "mixcut=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            preview: PreviewPrefs::default(),
            recording: RecordingDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PreviewPrefs {
    fn default() -> Self {
        Self { render_scale: 1.0 }
    }
}

impl Default for RecordingDefaults {
    fn default() -> Self {
        Self {
            screen_fps: 30,
            camera_fps: 15,
            audio_sample_rate: 48000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl EditorConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Update the persisted render scale.
    pub fn set_render_scale(&mut self, scale: f64) -> Result<(), std::io::Error> {
        self.preview.render_scale = scale.clamp(0.25, 2.0);
        self.save()
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("mixcut").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_render_scale_is_unity() {
        let config = EditorConfig::default();
        assert!((config.preview.render_scale - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_camera_rate_below_screen_rate() {
        let defaults = RecordingDefaults::default();
        assert!(defaults.camera_fps < defaults.screen_fps);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = EditorConfig::default();
        config.preview.render_scale = 0.5;
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EditorConfig = serde_json::from_str(&json).unwrap();
        assert!((parsed.preview.render_scale - 0.5).abs() < 1e-9);
    }
}
