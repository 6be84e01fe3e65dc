//! Configuration parsing and management for Facelink

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, FacelinkError};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub stream: StreamConfig,
    pub telemetry: TelemetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            stream: StreamConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FacelinkError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> Result<Self, FacelinkError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load configuration from default paths
    pub fn load() -> Result<Self, FacelinkError> {
        // Try config paths in order
        let paths = [
            PathBuf::from("config.toml"),
            PathBuf::from("config/default.toml"),
            dirs_path().join("config.toml"),
        ];

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), FacelinkError> {
        if self.tracker.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tracker.port".to_string(),
                message: "Port must be greater than 0".to_string(),
            }
            .into());
        }

        if self.tracker.capture_width == 0 || self.tracker.capture_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tracker.capture_width/capture_height".to_string(),
                message: "Capture dimensions must be greater than 0".to_string(),
            }
            .into());
        }

        if self.tracker.capture_fps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tracker.capture_fps".to_string(),
                message: "Capture FPS must be greater than 0".to_string(),
            }
            .into());
        }

        if self.tracker.auto_launch {
            let path = std::path::Path::new(&self.tracker.tracker_script);
            if !path.exists() {
                tracing::warn!(
                    "auto_launch enabled but tracker script not found at: {}",
                    self.tracker.tracker_script
                );
            }
        }

        if self.stream.enabled && self.stream.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stream.port".to_string(),
                message: "Port must be greater than 0".to_string(),
            }
            .into());
        }

        if self.telemetry.log_frame_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "telemetry.log_frame_interval".to_string(),
                message: "Log interval must be at least 1 frame".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Landmark tracker configuration
///
/// Covers both the UDP receiver side and the helper subprocess that owns the
/// capture device and preview window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// UDP port to receive landmark data on
    pub port: u16,
    /// Listen address for the UDP socket
    pub listen_address: String,
    /// Auto-launch the Python tracker subprocess
    pub auto_launch: bool,
    /// Path to the landmark tracker script
    pub tracker_script: String,
    /// Camera device index
    pub camera_device: u32,
    /// Camera capture width
    pub capture_width: u32,
    /// Camera capture height
    pub capture_height: u32,
    /// Camera capture FPS
    pub capture_fps: u32,
    /// Show the coordinate readout overlay in the tracker preview
    pub show_overlay: bool,
    /// Draw the raw landmark mesh in the tracker preview
    pub show_landmarks: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            port: 12480,
            listen_address: "127.0.0.1".to_string(),
            auto_launch: true,
            tracker_script: "scripts/landmark_tracker.py".to_string(),
            camera_device: 0,
            capture_width: 640,
            capture_height: 480,
            capture_fps: 30,
            show_overlay: true,
            show_landmarks: false,
        }
    }
}

/// Coordinate stream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Enable the TCP coordinate stream
    pub enabled: bool,
    /// Downstream consumer host
    pub host: String,
    /// Downstream consumer port
    pub port: u16,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Log the coordinate readout every N processed frames
    pub log_frame_interval: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_frame_interval: 10,
        }
    }
}

/// Get the platform-specific configuration directory
fn dirs_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        if let Some(config_dir) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(config_dir).join("facelink");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config/facelink");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Application Support/facelink");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("facelink");
        }
    }

    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tracker.camera_device, 0);
        assert_eq!(config.tracker.capture_width, 640);
        assert_eq!(config.stream.port, 5000);
        assert!(config.stream.enabled);
        assert_eq!(config.telemetry.log_frame_interval, 10);
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [tracker]
            camera_device = 2
            capture_fps = 24
            show_landmarks = true

            [stream]
            host = "192.168.1.20"
            port = 5005
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.tracker.camera_device, 2);
        assert_eq!(config.tracker.capture_fps, 24);
        assert!(config.tracker.show_landmarks);
        assert_eq!(config.stream.host, "192.168.1.20");
        assert_eq!(config.stream.port, 5005);
        // Untouched sections keep their defaults
        assert_eq!(config.tracker.port, 12480);
        assert_eq!(config.telemetry.log_frame_interval, 10);
    }

    #[test]
    fn test_validation_rejects_zero_dimensions() {
        let mut config = Config::default();
        config.tracker.capture_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_log_interval() {
        let mut config = Config::default();
        config.telemetry.log_frame_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_ignores_stream_port_when_disabled() {
        let mut config = Config::default();
        config.stream.enabled = false;
        config.stream.port = 0;
        assert!(config.validate().is_ok());
    }
}
