//! Engine configuration.
//!
//! Gesture thresholds, clamp/snap policy, per-kind scale bounds and the
//! log level, stored as JSON. Every field has a serde default so older or
//! partial files keep loading.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slotframe_gesture::GestureThresholds;

use crate::constants::{
    DEFAULT_OVERSCROLL_MARGIN, DEFAULT_SNAP_TARGETS, DEFAULT_SNAP_TOLERANCE,
    SLIDER_JUMP_DURATION_MS, SLIDER_THUMB_SIZE,
};
use crate::element::{ElementKind, KindBounds};
use crate::overlay::OverlayPolicy;
use crate::scale_slider::ScaleSlider;

/// Log level setting for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Engine configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Recognizer activation thresholds
    #[serde(default)]
    pub gestures: GestureThresholds,

    /// Overscroll allowed mid-drag, in pixels
    #[serde(default = "default_overscroll_margin")]
    pub overscroll_margin: f32,

    /// Rotation snap targets in degrees
    #[serde(default = "default_snap_targets")]
    pub snap_targets: Vec<f32>,

    /// Rotation snap window in degrees
    #[serde(default = "default_snap_tolerance")]
    pub snap_tolerance: f32,

    /// Scale range per element kind
    #[serde(default)]
    pub scale_bounds: KindBounds,

    #[serde(default = "default_slider_thumb_size")]
    pub slider_thumb_size: f32,

    #[serde(default = "default_slider_jump_duration_ms")]
    pub slider_jump_duration_ms: u64,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_overscroll_margin() -> f32 {
    DEFAULT_OVERSCROLL_MARGIN
}

fn default_snap_targets() -> Vec<f32> {
    DEFAULT_SNAP_TARGETS.to_vec()
}

fn default_snap_tolerance() -> f32 {
    DEFAULT_SNAP_TOLERANCE
}

fn default_slider_thumb_size() -> f32 {
    SLIDER_THUMB_SIZE
}

fn default_slider_jump_duration_ms() -> u64 {
    SLIDER_JUMP_DURATION_MS
}

impl EngineConfig {
    /// Create a configuration with built-in defaults.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            gestures: GestureThresholds::default(),
            overscroll_margin: default_overscroll_margin(),
            snap_targets: default_snap_targets(),
            snap_tolerance: default_snap_tolerance(),
            scale_bounds: KindBounds::default(),
            slider_thumb_size: default_slider_thumb_size(),
            slider_jump_duration_ms: default_slider_jump_duration_ms(),
            log_level: LogLevel::default(),
        }
    }

    /// Clamp/snap settings for an overlay of the given kind.
    pub fn overlay_policy(&self, kind: ElementKind) -> OverlayPolicy {
        OverlayPolicy {
            bounds: self.scale_bounds.for_kind(kind),
            overscroll_margin: self.overscroll_margin,
            snap_targets: self.snap_targets.clone(),
            snap_tolerance: self.snap_tolerance,
        }
    }

    pub fn slider_jump_duration(&self) -> Duration {
        Duration::from_millis(self.slider_jump_duration_ms)
    }

    /// Scale slider for an element of `kind`, with the configured bounds,
    /// thumb size and jump duration.
    pub fn scale_slider(&self, kind: ElementKind, track_height: f32, scale: f32) -> ScaleSlider {
        ScaleSlider::new(self.scale_bounds.for_kind(kind), track_height, scale)
            .thumb_size(self.slider_thumb_size)
            .jump_duration(self.slider_jump_duration())
    }

    /// Serialize configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the configuration, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "slotframe.json"
    }

    /// Get the default config file path (platform-specific config directory).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("slotframe").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("slotframe")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    ///
    /// Returns `None` when there is no file or it cannot be used.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", path);
                Some(config)
            }
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save(&path)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ScaleBounds;
    use crate::scale_slider::SliderOutput;

    #[test]
    fn test_json_round_trip() {
        let mut config = EngineConfig::new();
        config.snap_tolerance = 3.0;
        config.log_level = LogLevel::Debug;
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(config, EngineConfig::new());
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "version": 1,
            "gestures": {"tap_max_duration_ms": 300},
            "scale_bounds": {"text": {"min": 0.8, "max": 2.0}},
            "log_level": "warn"
        }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.gestures.tap_max_duration_ms, 300);
        assert_eq!(config.gestures.pan_min_distance, GestureThresholds::default().pan_min_distance);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Warn);

        let policy = config.overlay_policy(ElementKind::Text);
        assert_eq!(policy.bounds, ScaleBounds::new(0.8, 2.0));
        assert_eq!(policy.overscroll_margin, DEFAULT_OVERSCROLL_MARGIN);
        assert_eq!(
            config.overlay_policy(ElementKind::Logo).bounds,
            ElementKind::Logo.default_bounds()
        );
    }

    #[test]
    fn test_slider_uses_configured_jump_duration() {
        let json = r#"{"version": 1, "slider_jump_duration_ms": 40}"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.slider_jump_duration(), Duration::from_millis(40));

        let mut slider = config.scale_slider(ElementKind::Logo, 224.0, 1.0);
        slider.press(12.0);
        assert!(matches!(slider.release(12.0), Some(SliderOutput::Preview(_))));
        assert!(matches!(
            slider.advance(Duration::from_millis(40)),
            Some(SliderOutput::Commit(_))
        ));
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = EngineConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                supported_version: CONFIG_VERSION
            }
        ));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("slotframe-config-{}", std::process::id()));
        let path = dir.join("nested").join(EngineConfig::default_filename());

        let mut config = EngineConfig::new();
        config.overscroll_margin = 12.0;
        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);

        let _ = std::fs::remove_dir_all(&dir);
        assert!(matches!(EngineConfig::load(&path), Err(ConfigError::IoError(_))));
    }
}
