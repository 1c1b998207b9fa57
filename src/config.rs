//! Viewer configuration.
//!
//! Values are read from a TOML file named by `DICOMSCOPE_CONFIG`, falling back
//! to `dicomscope.toml` in the working directory and then to built-in defaults.
//! Every section is optional. Loaded values are sanitized before use.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const CONFIG_ENV_VAR: &str = "DICOMSCOPE_CONFIG";
const CONFIG_FILENAME: &str = "dicomscope.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub zoom: ZoomConfig,
    pub gesture: GestureConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Used when a frame carries no window, and when a window with width <= 0 is set.
    pub default_center: f64,
    pub default_width: f64,
    pub center_min: f64,
    pub center_max: f64,
    pub width_min: f64,
    pub width_max: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_center: 40.0,
            default_width: 400.0,
            center_min: -1024.0,
            center_max: 3000.0,
            width_min: 1.0,
            width_max: 4000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    pub wheel_in: f64,
    pub wheel_out: f64,
    pub step_in: f64,
    pub step_out: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 50.0,
            wheel_in: 1.1,
            wheel_out: 0.9,
            step_in: 1.2,
            step_out: 0.8,
        }
    }
}

/// Key that turns the wheel from slice navigation into zoom. `control` is the
/// Control key on every platform, including macOS where it is not Cmd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ZoomModifier {
    #[default]
    Control,
    Shift,
    Alt,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub center_sensitivity: f64,
    pub width_sensitivity: f64,
    pub zoom_modifier: ZoomModifier,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            center_sensitivity: 2.0,
            width_sensitivity: 2.0,
            zoom_modifier: ZoomModifier::Control,
        }
    }
}

impl ViewerConfig {
    /// Resolve the config file and load it, logging (not failing on) problems.
    pub fn load() -> Self {
        let Some(path) = Self::locate() else {
            log::debug!("No config file found, using built-in defaults");
            return Self::default();
        };

        match Self::from_path(&path) {
            Ok(config) => {
                log::info!("Loaded viewer config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("{err}; using built-in defaults");
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let config: ViewerConfig = toml::from_str(text)?;
        let (config, warnings) = config.sanitize();
        for warning in warnings {
            log::warn!("Config: {warning}");
        }
        Ok(config)
    }

    fn locate() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(CONFIG_FILENAME);
        local.is_file().then_some(local)
    }

    /// Replace unusable values with defaults, returning one note per fix.
    pub fn sanitize(mut self) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let window_defaults = WindowConfig::default();
        let zoom_defaults = ZoomConfig::default();
        let gesture_defaults = GestureConfig::default();

        let window = &mut self.window;
        if !(window.center_min.is_finite()
            && window.center_max.is_finite()
            && window.center_min <= window.center_max)
        {
            warnings.push(format!(
                "invalid center range [{}, {}], using [{}, {}]",
                window.center_min,
                window.center_max,
                window_defaults.center_min,
                window_defaults.center_max
            ));
            window.center_min = window_defaults.center_min;
            window.center_max = window_defaults.center_max;
        }
        if !(window.width_min.is_finite()
            && window.width_max.is_finite()
            && window.width_min > 0.0
            && window.width_min <= window.width_max)
        {
            warnings.push(format!(
                "invalid width range [{}, {}], using [{}, {}]",
                window.width_min, window.width_max, window_defaults.width_min, window_defaults.width_max
            ));
            window.width_min = window_defaults.width_min;
            window.width_max = window_defaults.width_max;
        }
        if !(window.default_width.is_finite() && window.default_width > 0.0)
            || !window.default_center.is_finite()
        {
            warnings.push(format!(
                "invalid default window {}/{}, using {}/{}",
                window.default_center,
                window.default_width,
                window_defaults.default_center,
                window_defaults.default_width
            ));
            window.default_center = window_defaults.default_center;
            window.default_width = window_defaults.default_width;
        }

        let zoom = &mut self.zoom;
        if !(zoom.min.is_finite() && zoom.max.is_finite() && zoom.min > 0.0 && zoom.min <= zoom.max)
        {
            warnings.push(format!(
                "invalid zoom range [{}, {}], using [{}, {}]",
                zoom.min, zoom.max, zoom_defaults.min, zoom_defaults.max
            ));
            zoom.min = zoom_defaults.min;
            zoom.max = zoom_defaults.max;
        }
        for (name, value, fallback) in [
            ("wheel_in", &mut zoom.wheel_in, zoom_defaults.wheel_in),
            ("wheel_out", &mut zoom.wheel_out, zoom_defaults.wheel_out),
            ("step_in", &mut zoom.step_in, zoom_defaults.step_in),
            ("step_out", &mut zoom.step_out, zoom_defaults.step_out),
        ] {
            if !(value.is_finite() && *value > 0.0) {
                warnings.push(format!("zoom.{name} = {value} is not positive, using {fallback}"));
                *value = fallback;
            }
        }

        let gesture = &mut self.gesture;
        for (name, value, fallback) in [
            (
                "center_sensitivity",
                &mut gesture.center_sensitivity,
                gesture_defaults.center_sensitivity,
            ),
            (
                "width_sensitivity",
                &mut gesture.width_sensitivity,
                gesture_defaults.width_sensitivity,
            ),
        ] {
            if !value.is_finite() {
                warnings.push(format!("gesture.{name} = {value} is not finite, using {fallback}"));
                *value = fallback;
            }
        }

        (self, warnings)
    }
}
