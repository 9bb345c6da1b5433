// src/config.rs
//
// Link configuration loaded from TOML:
//
//   [serial]
//   port = "/dev/ttyACM0"
//   baud_rate = 115200
//
//   [manager]
//   poll_interval_us = 1000
//
//   [framing]
//   type = "pattern"
//   pattern = "a55a0ff0c33c9669"
//   length_bytes = 2

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SerialError};
use crate::framer::FramingEncoding;
use crate::io::SerialConfig;
use crate::manager::ManagerConfig;

/// Everything needed to bring up a framed serial link
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub serial: SerialConfig,
    #[serde(default)]
    pub manager: ManagerConfig,
    #[serde(default)]
    pub framing: FramingEncoding,
}

impl LinkConfig {
    pub fn new(serial: SerialConfig, framing: FramingEncoding) -> Self {
        Self {
            serial,
            manager: ManagerConfig::default(),
            framing,
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: LinkConfig =
            toml::from_str(text).map_err(|e| SerialError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SerialError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        tlog!(
            "[config] Loaded {} ({} at {}, {} framing)",
            path.display(),
            config.serial.port,
            config.serial.describe(),
            config.framing.name()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.serial.validate()?;
        self.manager.validate()?;
        self.framing.validate()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SerialError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Parity;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = LinkConfig::from_toml_str("[serial]\nport = \"COM4\"\n").unwrap();
        assert_eq!(config.serial, SerialConfig::new("COM4", 115_200));
        assert_eq!(config.manager, ManagerConfig::default());
        assert_eq!(config.framing, FramingEncoding::Cobs);
    }

    #[test]
    fn test_full_config() {
        let text = r#"
[serial]
port = "/dev/ttyUSB0"
baud_rate = 9600
data_bits = 7
stop_bits = 2
parity = "even"
read_timeout_ms = 250

[manager]
poll_interval_us = 500

[framing]
type = "pattern"
pattern = "a55a0ff0"
length_bytes = 4
rejoin = false
"#;
        let config = LinkConfig::from_toml_str(text).unwrap();
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.parity, Parity::Even);
        assert_eq!(config.serial.describe(), "9600 7E2");
        assert_eq!(config.manager.poll_interval_us, 500);
        assert_eq!(
            config.framing,
            FramingEncoding::Pattern {
                pattern: vec![0xA5, 0x5A, 0x0F, 0xF0],
                length_bytes: 4,
                rejoin: false,
            }
        );
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let cases = [
            "",
            "[serial]\nport = \"\"\n",
            "[serial]\nport = \"COM1\"\nbaud_rate = 0\n",
            "[serial]\nport = \"COM1\"\n[framing]\ntype = \"pattern\"\npattern = \"\"\n",
            "[serial]\nport = \"COM1\"\n[framing]\ntype = \"pattern\"\npattern = \"zz\"\n",
            "[serial]\nport = \"COM1\"\n[framing]\ntype = \"slip\"\n",
            "[serial]\nport = \"COM1\"\n[manager]\npoll_interval_us = 0\n",
        ];
        for text in cases {
            assert!(
                matches!(LinkConfig::from_toml_str(text), Err(SerialError::Config(_))),
                "accepted: {:?}",
                text
            );
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("labserial-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("link.toml");

        let config = LinkConfig::new(
            SerialConfig::new("/dev/ttyACM1", 57_600),
            FramingEncoding::pattern(b"----".to_vec()),
        );
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(LinkConfig::load(&path).unwrap(), config);

        assert!(LinkConfig::load(&dir.join("missing.toml")).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
