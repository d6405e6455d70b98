//! Bridge configuration and its TOML file format.
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyACM0"
//! baud_rate = 115200
//!
//! [general]
//! enable_keyboard = true
//! enable_controller = true
//! update_rate_hz = 1000
//! controller_deadzone = 10
//!
//! [key_bindings]
//! k = "button:A"
//! up = "dpad:up"
//! w = "lstick:up"
//!
//! [controller_bindings]
//! "0" = "B"
//!
//! [calibration.left]
//! calibrated = true
//! x = { center = 128, min = 10, max = 250 }
//! y = { center = 127, min = 5, max = 251 }
//! ```
//!
//! Every section is optional. A missing `[key_bindings]` section keeps
//! the stock layout; a present one replaces it entirely.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use switch_proto::{Buttons, Stick};

use crate::binding::{is_known_key, Binding, BindingConfig};
use crate::calibration::StickCalibration;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "switch-bridge.toml";

/// Error type for configuration loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        let port = if cfg!(windows) { "COM3" } else { "/dev/ttyACM0" };
        Self {
            port: port.to_owned(),
            baud_rate: 115_200,
        }
    }
}

/// Input sources and loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub enable_keyboard: bool,
    pub enable_controller: bool,
    pub update_rate_hz: u32,
    /// Percentage of full scale, 0-100.
    pub controller_deadzone: u8,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enable_keyboard: true,
            enable_controller: true,
            update_rate_hz: 1000,
            controller_deadzone: 10,
        }
    }
}

/// Per-stick calibration records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub left: StickCalibration,
    pub right: StickCalibration,
}

impl CalibrationConfig {
    #[must_use]
    pub const fn stick(&self, stick: Stick) -> &StickCalibration {
        match stick {
            Stick::Left => &self.left,
            Stick::Right => &self.right,
        }
    }

    pub fn stick_mut(&mut self, stick: Stick) -> &mut StickCalibration {
        match stick {
            Stick::Left => &mut self.left,
            Stick::Right => &mut self.right,
        }
    }
}

/// Complete, validated bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BridgeConfig {
    pub serial: SerialConfig,
    pub general: GeneralConfig,
    pub bindings: BindingConfig,
    pub calibration: CalibrationConfig,
}

/// On-disk layout. Binding strings stay raw until validation.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    serial: SerialConfig,
    general: GeneralConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_bindings: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    controller_bindings: BTreeMap<String, String>,
    calibration: CalibrationConfig,
}

impl BridgeConfig {
    /// Parse and validate a configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        Self::try_from(file)
    }

    /// Serialize to a TOML document that [`from_toml_str`](Self::from_toml_str) accepts.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&ConfigFile::from(self))?)
    }

    /// Load and validate the configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path`, falling back to defaults when it is missing or defective.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(ConfigError::Io { ref source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("No configuration at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Ignoring configuration {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Write the configuration to `path` as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })
    }

    /// Apply command-line serial overrides on top of the file values.
    pub fn apply_serial_overrides(&mut self, port: Option<String>, baud_rate: Option<u32>) {
        if let Some(port) = port {
            self.serial.port = port;
        }
        if let Some(baud_rate) = baud_rate {
            self.serial.baud_rate = baud_rate;
        }
    }

    /// Check the value ranges that deserialization cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.update_rate_hz == 0 {
            return Err(ConfigError::Invalid("general.update_rate_hz must be at least 1".into()));
        }
        if self.general.controller_deadzone > 100 {
            return Err(ConfigError::Invalid(format!(
                "general.controller_deadzone must be 0-100, got {}",
                self.general.controller_deadzone
            )));
        }
        if self.serial.baud_rate == 0 {
            return Err(ConfigError::Invalid("serial.baud_rate must not be 0".into()));
        }
        for stick in [Stick::Left, Stick::Right] {
            let calibration = self.calibration.stick(stick);
            if !calibration.calibrated {
                continue;
            }
            for (name, axis) in [("x", &calibration.x), ("y", &calibration.y)] {
                if !axis.in_domain() {
                    return Err(ConfigError::Invalid(format!(
                        "calibration.{}.{name} values must be 0-255, got min {} center {} max {}",
                        stick_key(stick),
                        axis.min,
                        axis.center,
                        axis.max
                    )));
                }
            }
        }
        Ok(())
    }
}

fn stick_key(stick: Stick) -> &'static str {
    match stick {
        Stick::Left => "left",
        Stick::Right => "right",
    }
}

impl TryFrom<ConfigFile> for BridgeConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let mut bindings = match file.key_bindings {
            None => BindingConfig::default(),
            Some(keys) => {
                let mut bindings = BindingConfig::empty();
                for (key, value) in keys {
                    let binding: Binding = value
                        .parse()
                        .map_err(|e| ConfigError::Invalid(format!("key_bindings.{key}: {e}")))?;
                    if !is_known_key(&key) {
                        warn!("Unknown key name `{key}` in key_bindings; it will never trigger");
                    }
                    bindings.insert(key, binding);
                }
                bindings
            }
        };

        for (index, target) in &file.controller_bindings {
            let parsed_index: u8 = index.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("controller_bindings: `{index}` is not a button index"))
            })?;
            let mask = parse_button_target(target).ok_or_else(|| {
                ConfigError::Invalid(format!("controller_bindings.{index}: unknown button `{target}`"))
            })?;
            bindings
                .add_controller_binding(parsed_index, mask)
                .map_err(|e| ConfigError::Invalid(format!("controller_bindings: {e}")))?;
        }

        let config = Self {
            serial: file.serial,
            general: file.general,
            bindings,
            calibration: file.calibration,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<&BridgeConfig> for ConfigFile {
    fn from(config: &BridgeConfig) -> Self {
        let key_bindings = config
            .bindings
            .iter()
            .map(|(key, binding)| (key.to_owned(), binding.to_string()))
            .collect();
        let controller_bindings = config
            .bindings
            .controller_bindings()
            .iter()
            .map(|b| (b.index.to_string(), b.mask.name().unwrap_or("NONE").to_owned()))
            .collect();
        Self {
            serial: config.serial.clone(),
            general: config.general,
            key_bindings: Some(key_bindings),
            controller_bindings,
            calibration: config.calibration,
        }
    }
}

/// `B` or `button:B`.
fn parse_button_target(target: &str) -> Option<Buttons> {
    let target = target.trim();
    let name = target.strip_prefix("button:").unwrap_or(target);
    Buttons::from_name(name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::AxisCalibration;
    use switch_proto::Direction;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = BridgeConfig::from_toml_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.general.update_rate_hz, 1000);
        assert_eq!(config.general.controller_deadzone, 10);
        assert!(config.general.enable_keyboard && config.general.enable_controller);
        assert!(!config.calibration.left.calibrated);
    }

    #[test]
    fn test_full_document() {
        let text = r#"
            [serial]
            port = "/dev/ttyUSB1"

            [general]
            enable_keyboard = false
            update_rate_hz = 250
            controller_deadzone = 15

            [key_bindings]
            space = "button:A"
            q = "rstick:left"

            [controller_bindings]
            "0" = "B"
            "7" = "button:PLUS"

            [calibration.right]
            calibrated = true
            x = { center = 130, min = 12, max = 240 }
        "#;
        let config = BridgeConfig::from_toml_str(text).unwrap();

        assert_eq!(config.serial.port, "/dev/ttyUSB1");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert!(!config.general.enable_keyboard);
        assert!(config.general.enable_controller);
        assert_eq!(config.general.update_rate_hz, 250);
        assert_eq!(config.general.controller_deadzone, 15);

        assert_eq!(config.bindings.len(), 2);
        assert_eq!(config.bindings.lookup("space"), Some(Binding::Button(Buttons::A)));
        assert_eq!(config.bindings.lookup("q"), Some(Binding::RightStick(Direction::Left)));
        assert_eq!(config.bindings.lookup("k"), None);
        assert_eq!(config.bindings.resolve_buttons(0b1000_0001, Buttons::NONE), Buttons::B | Buttons::PLUS);

        assert!(config.calibration.right.calibrated);
        assert_eq!(config.calibration.right.x, AxisCalibration::new(12, 130, 240));
        assert_eq!(config.calibration.right.y, AxisCalibration::default());
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            "[general]\nupdate_rate_hz = 0",
            "[general]\ncontroller_deadzone = 101",
            "[key_bindings]\nk = \"button:JUMP\"",
            "[key_bindings]\nk = \"A\"",
            "[controller_bindings]\n\"x\" = \"A\"",
            "[controller_bindings]\n\"64\" = \"A\"",
            "[controller_bindings]\n\"3\" = \"JUMP\"",
            "[calibration.left]\ncalibrated = true\nx = { center = 128, min = -20000000, max = 255 }",
            "[calibration.right]\ncalibrated = true\ny = { center = 300, min = 0, max = 255 }",
        ];
        for text in cases {
            let result = BridgeConfig::from_toml_str(text);
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "{text}: {result:?}");
        }
    }

    #[test]
    fn test_out_of_range_calibration_ignored_while_uncalibrated() {
        let text = "[calibration.left]\ncalibrated = false\nx = { center = 128, min = -20000000, max = 255 }";
        let config = BridgeConfig::from_toml_str(text).unwrap();
        assert_eq!(config.calibration.left.x.min, -20_000_000);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = BridgeConfig::from_toml_str("[general\nupdate_rate_hz = 1");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let result = BridgeConfig::from_toml_str("[general]\nupdate_rate_hz = \"fast\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let mut config = BridgeConfig::default();
        config.general.update_rate_hz = 500;
        config.bindings.add_controller_binding(2, Buttons::ZL).unwrap();
        config.calibration.left = StickCalibration {
            calibrated: true,
            x: AxisCalibration::new(3, 125, 252),
            y: AxisCalibration::new(1, 131, 255),
        };
        config.save(&path).unwrap();

        let loaded = BridgeConfig::load(&path).unwrap();
        assert_eq!(loaded.general, config.general);
        assert_eq!(loaded.calibration, config.calibration);
        assert_eq!(loaded.bindings.controller_bindings(), config.bindings.controller_bindings());
        for (key, binding) in config.bindings.iter() {
            assert_eq!(loaded.bindings.lookup(key), Some(binding), "{key}");
        }
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(BridgeConfig::load_or_default(&missing), BridgeConfig::default());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[general]\ncontroller_deadzone = 200").unwrap();
        assert!(matches!(BridgeConfig::load(&broken), Err(ConfigError::Invalid(_))));
        assert_eq!(BridgeConfig::load_or_default(&broken), BridgeConfig::default());
    }

    #[test]
    fn test_serial_overrides_win() {
        let mut config = BridgeConfig::default();
        config.apply_serial_overrides(Some("COM7".into()), None);
        assert_eq!(config.serial.port, "COM7");
        assert_eq!(config.serial.baud_rate, 115_200);
        config.apply_serial_overrides(None, Some(9600));
        assert_eq!(config.serial.baud_rate, 9600);
    }
}
