//! Overlay configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "targets_path": "Targeting/Hud/Targets",
//!   "camera_path": "/UI Root/Camera",
//!   "marker_name": "TargetBoxScriptFlat",
//!   "camera_retry_interval": "250ms",
//!   "discovery_interval": "1s",
//!   "selection_interval": "250ms",
//!   "frame_interval": "16ms",
//!   "pause_hotkey": "ctrl+alt+p"
//! }
//! ```

use crate::error::{OverlayError, Result};
use crate::registry::DEFAULT_MARKER_NAME;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Directory under the platform data dir that holds overlay state.
pub const APP_DIR: &str = "NACHSAVE";

/// Subdirectory for the key binding files.
pub const BINDINGS_DIR: &str = "NEXTTGT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Path of the container whose direct children are target boxes.
    #[serde(default = "default_targets_path")]
    pub targets_path: String,

    /// Path of the object carrying the overlay camera.
    #[serde(default = "default_camera_path")]
    pub camera_path: String,

    /// Runtime type name of the target marker component.
    #[serde(default = "default_marker_name")]
    pub marker_name: String,

    #[serde(
        default = "default_camera_retry_interval",
        with = "duration_format"
    )]
    pub camera_retry_interval: Duration,

    #[serde(default = "default_discovery_interval", with = "duration_format")]
    pub discovery_interval: Duration,

    #[serde(default = "default_selection_interval", with = "duration_format")]
    pub selection_interval: Duration,

    /// Input polling period when the overlay drives its own frame loop.
    #[serde(default = "default_frame_interval", with = "duration_format")]
    pub frame_interval: Duration,

    /// Binding file directory; defaults to `<data dir>/NACHSAVE/NEXTTGT`.
    #[serde(default)]
    pub bindings_dir: Option<PathBuf>,

    /// Optional global hotkey that toggles a manual pause.
    #[serde(default)]
    pub pause_hotkey: Option<String>,

    #[serde(default)]
    pub verbose: bool,
}

fn default_targets_path() -> String {
    "Targeting/Hud/Targets".to_string()
}

fn default_camera_path() -> String {
    "/UI Root/Camera".to_string()
}

fn default_marker_name() -> String {
    DEFAULT_MARKER_NAME.to_string()
}

fn default_camera_retry_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_discovery_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_selection_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_frame_interval() -> Duration {
    Duration::from_millis(16)
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            targets_path: default_targets_path(),
            camera_path: default_camera_path(),
            marker_name: default_marker_name(),
            camera_retry_interval: default_camera_retry_interval(),
            discovery_interval: default_discovery_interval(),
            selection_interval: default_selection_interval(),
            frame_interval: default_frame_interval(),
            bindings_dir: None,
            pause_hotkey: None,
            verbose: false,
        }
    }
}

impl OverlayConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| OverlayError::config_load(path, e.to_string()))?;
        let config: OverlayConfig = serde_json::from_str(&content)
            .map_err(|e| OverlayError::config_load(path, e.to_string()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| OverlayError::config_save(path, e.to_string()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets_path.trim().is_empty() {
            return Err(OverlayError::invalid_configuration(
                "targets_path cannot be empty",
            ));
        }
        if self.camera_path.trim().is_empty() {
            return Err(OverlayError::invalid_configuration(
                "camera_path cannot be empty",
            ));
        }
        if self.marker_name.trim().is_empty() {
            return Err(OverlayError::invalid_configuration(
                "marker_name cannot be empty",
            ));
        }

        let intervals = [
            ("camera_retry_interval", self.camera_retry_interval),
            ("discovery_interval", self.discovery_interval),
            ("selection_interval", self.selection_interval),
            ("frame_interval", self.frame_interval),
        ];
        for (name, interval) in intervals {
            if interval.is_zero() {
                return Err(OverlayError::invalid_configuration(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Directory holding the key binding files.
    pub fn bindings_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.bindings_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|data| data.join(APP_DIR).join(BINDINGS_DIR))
            .ok_or_else(|| {
                OverlayError::invalid_configuration("no platform data directory available")
            })
    }
}

/// Parse a duration such as `"250ms"`, `"1s"` or `"2m"`. A bare number is
/// taken as milliseconds.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() {
        return Err(OverlayError::invalid_duration(value, "empty duration"));
    }

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    if number.is_empty() {
        return Err(OverlayError::invalid_duration(value, "missing number"));
    }
    let amount: u64 = number
        .parse()
        .map_err(|_| OverlayError::invalid_duration(value, "number out of range"))?;

    match unit.trim() {
        "" | "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => Ok(Duration::from_secs(amount.saturating_mul(60))),
        other => Err(OverlayError::invalid_duration(
            value,
            format!("unknown unit '{}'", other),
        )),
    }
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 60_000 == 0 && millis > 0 {
        format!("{}m", millis / 60_000)
    } else if millis % 1000 == 0 && millis > 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{}ms", millis)
    }
}

mod duration_format {
    use super::*;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Duration, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse_duration(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: OverlayConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, OverlayConfig::default());
        assert_eq!(config.targets_path, "Targeting/Hud/Targets");
        assert_eq!(config.camera_path, "/UI Root/Camera");
        assert_eq!(config.discovery_interval, Duration::from_secs(1));
        assert_eq!(config.selection_interval, Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("1000").unwrap(), Duration::from_millis(1000));
        assert_eq!(parse_duration("5S").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration(" 2m ").unwrap(), Duration::from_secs(120));

        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("-5ms").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(1)), "1s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
        assert_eq!(format_duration(Duration::ZERO), "0ms");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = OverlayConfig {
            selection_interval: Duration::ZERO,
            ..OverlayConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_bindings_dir() {
        let config = OverlayConfig {
            bindings_dir: Some(PathBuf::from("/tmp/nts")),
            ..OverlayConfig::default()
        };
        assert_eq!(config.bindings_dir().unwrap(), PathBuf::from("/tmp/nts"));
    }
}
