use serde::{Deserialize, Serialize};
use sp6_codec::{
    ConvertOptions, Converter, HeatshrinkError, HeatshrinkParams, PanelRotation, PanelSpec,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SP6_CONFIG";

/// Environment variable overriding `device_url`.
pub const DEVICE_URL_ENV: &str = "SP6_DEVICE_URL";

/// Config file read when `SP6_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "sp6push.yaml";

/// Application configuration loaded from sp6push.yaml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Device upload endpoint
    #[serde(default = "default_device_url")]
    pub device_url: String,

    /// Panel side length in pixels
    #[serde(default = "default_panel_size")]
    pub panel_size: u32,

    /// Panel mounting rotation in degrees
    #[serde(default = "default_panel_rotation")]
    pub panel_rotation: i32,

    /// Green channel gain
    #[serde(default = "default_tone_gain")]
    pub tone_gain: f32,

    /// Floyd-Steinberg dithering
    #[serde(default)]
    pub dither: bool,

    /// Whiten pixels outside the inscribed circle
    #[serde(default)]
    pub round_mask: bool,

    #[serde(default)]
    pub heatshrink: HeatshrinkConfig,

    /// HTTP timeout for uploads, in seconds
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,
}

/// Heatshrink parameters as written in the config file.
///
/// Kept unvalidated here; the codec validates them when the engine is first
/// used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeatshrinkConfig {
    #[serde(default = "default_window_bits")]
    pub window_bits: u8,

    #[serde(default = "default_lookahead_bits")]
    pub lookahead_bits: u8,
}

fn default_device_url() -> String {
    "http://espressif.lan/image".to_string()
}

fn default_panel_size() -> u32 {
    400
}

fn default_panel_rotation() -> i32 {
    180
}

fn default_tone_gain() -> f32 {
    1.0
}

fn default_upload_timeout() -> u64 {
    30
}

fn default_window_bits() -> u8 {
    HeatshrinkParams::DEFAULT.window_bits()
}

fn default_lookahead_bits() -> u8 {
    HeatshrinkParams::DEFAULT.lookahead_bits()
}

impl Default for HeatshrinkConfig {
    fn default() -> Self {
        Self {
            window_bits: default_window_bits(),
            lookahead_bits: default_lookahead_bits(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device_url: default_device_url(),
            panel_size: default_panel_size(),
            panel_rotation: default_panel_rotation(),
            tone_gain: default_tone_gain(),
            dither: false,
            round_mask: false,
            heatshrink: HeatshrinkConfig::default(),
            upload_timeout_secs: default_upload_timeout(),
        }
    }
}

impl AppConfig {
    /// Config file path: `SP6_CONFIG` if set, else `sp6push.yaml`.
    pub fn config_path() -> (PathBuf, bool) {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        }
    }

    /// Load from the resolved config path, then apply environment
    /// overrides.
    pub fn load() -> Self {
        let (path, explicit) = Self::config_path();
        let mut config = if path.exists() || explicit {
            Self::load_from_path(&path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_env();
        config
    }

    /// Load configuration from a YAML file, falling back to defaults on any
    /// failure.
    pub fn load_from_path(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content).unwrap_or_else(|e| {
                tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                Self::default()
            }),
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // an empty document deserializes as unit, not as a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        tracing::info!(
            device_url = %config.device_url,
            panel_size = config.panel_size,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Apply `SP6_DEVICE_URL` if set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(DEVICE_URL_ENV) {
            if !url.trim().is_empty() {
                self.device_url = url;
            }
        }
    }

    pub fn panel_spec(&self) -> PanelSpec {
        PanelSpec::new(
            self.panel_size as usize,
            PanelRotation::from_degrees(self.panel_rotation),
        )
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions::new()
            .tone_gain(self.tone_gain)
            .dither(self.dither)
            .round_mask(self.round_mask)
    }

    /// Converter for the configured panel with a lazily built heatshrink
    /// engine.
    pub fn converter(&self) -> Converter {
        Converter::with_heatshrink(
            self.panel_spec(),
            self.heatshrink.window_bits,
            self.heatshrink.lookahead_bits,
        )
    }

    /// Validated heatshrink parameters, for explicit heatshrink uploads.
    pub fn heatshrink_params(&self) -> Result<HeatshrinkParams, HeatshrinkError> {
        HeatshrinkParams::new(self.heatshrink.window_bits, self.heatshrink.lookahead_bits)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp6_codec::Quantizer;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.device_url, "http://espressif.lan/image");
        assert_eq!(config.panel_size, 400);
        assert_eq!(config.panel_rotation, 180);
        assert_eq!(config.tone_gain, 1.0);
        assert!(!config.dither);
        assert!(!config.round_mask);
        assert_eq!(config.heatshrink.window_bits, 10);
        assert_eq!(config.heatshrink.lookahead_bits, 4);
        assert_eq!(config.upload_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml(
            "device_url: http://panel.local/image\ndither: true\nheatshrink:\n  window_bits: 8\n",
        )
        .unwrap();

        assert_eq!(config.device_url, "http://panel.local/image");
        assert!(config.dither);
        assert_eq!(config.heatshrink.window_bits, 8);
        assert_eq!(config.heatshrink.lookahead_bits, 4);
        assert_eq!(config.panel_size, 400);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml("  \n").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(AppConfig::from_yaml("panel_size: [not, a, number]").is_err());
    }

    #[test]
    fn test_load_from_missing_path_falls_back() {
        let config = AppConfig::load_from_path(Path::new("/nonexistent/sp6push.yaml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sp6push.yaml");
        std::fs::write(&path, "panel_size: 64\nround_mask: true\ntone_gain: 1.5\n").unwrap();

        let config = AppConfig::load_from_path(&path);
        assert_eq!(config.panel_size, 64);
        assert!(config.round_mask);
        assert_eq!(config.panel_spec().size(), 64);
    }

    #[test]
    fn test_conversion_settings_follow_config() {
        let config = AppConfig {
            panel_rotation: 0,
            dither: true,
            tone_gain: 1.25,
            ..AppConfig::default()
        };
        assert_eq!(config.panel_spec().rotation(), PanelRotation::Upright);
        let options = config.convert_options();
        assert_eq!(options.quantizer(), Quantizer::FloydSteinberg);
        assert_eq!(options.gain().green_gain(), 1.25);
    }

    #[test]
    fn test_heatshrink_params_are_validated() {
        let mut config = AppConfig::default();
        assert!(config.heatshrink_params().is_ok());
        config.heatshrink.lookahead_bits = 12;
        assert!(config.heatshrink_params().is_err());
    }
}
