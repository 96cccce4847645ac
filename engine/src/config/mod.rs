//! Configuration management
//!
//! This module handles loading and validation of the sweepd configuration.
//! Configuration is stored in TOML format at ~/.sweepd/config.toml unless an
//! alternate path is passed with `--config`.
//!
//! # Configuration Sections
//!
//! - **core**: log level
//! - **grouping**: window duration and anchoring behavior
//! - **device**: Home Assistant endpoint, vacuum entity, timeouts, test mode
//! - **intake**: HTTP listener address
//! - **zones**: the zone table, one entry per virtual cleaning target
//!
//! A malformed zone table is a startup failure. Nothing in this module is
//! consulted again after load; the rest of the engine works from immutable
//! values derived here.
//!
//! # Examples
//!
//! ```no_run
//! use sweepd_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_default()?;
//! println!("window: {}ms", config.grouping.window_ms);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use sdk::types::{CleaningMode, SegmentId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Grouping window settings
    #[serde(default)]
    pub grouping: GroupingConfig,

    /// Physical device settings
    #[serde(default)]
    pub device: DeviceConfig,

    /// Intake listener settings
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Zone table: zone identifier to its segments and default mode
    pub zones: HashMap<String, ZoneConfig>,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Grouping window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Window duration in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// What the window expiry is anchored to
    #[serde(default)]
    pub anchor: WindowAnchor,
}

/// Anchoring behavior of the grouping window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAnchor {
    /// The window expires a fixed duration after the first request of the
    /// batch; later requests join but do not extend it. Bounds the
    /// worst-case latency between the first voice command and the robot
    /// starting to move.
    #[default]
    FirstRequest,

    /// Every request re-arms the full window; the batch executes after a
    /// quiet period with no new requests.
    LastRequest,
}

/// Physical device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Home Assistant base URL, e.g. "http://homeassistant.local:8123"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Long-lived Home Assistant access token
    #[serde(default)]
    pub token: String,

    /// Vacuum entity id, e.g. "vacuum.x40_ultra_complete"
    #[serde(default)]
    pub entity_id: String,

    /// Integration domain providing the segment services
    /// (e.g. "dreame_vacuum", "xiaomi_miio", "roborock")
    #[serde(default = "default_service_domain")]
    pub service_domain: String,

    /// Seconds to wait for a stop acknowledgment
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_secs: u64,

    /// Seconds to wait for any other command acknowledgment
    #[serde(default = "default_ack_timeout")]
    pub ack_timeout_secs: u64,

    /// Substitute the device with an in-memory recorder. Commands are
    /// logged instead of executed; no robot moves.
    #[serde(default)]
    pub test_mode: bool,
}

/// Intake listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Listen address for the HTTP intake surface
    #[serde(default = "default_listen")]
    pub listen: String,
}

/// A single zone entry in the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Optional display name; the zone key is used when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Robot segment ids covered by this zone
    pub segments: Vec<SegmentId>,

    /// Default cleaning mode; `sweeping` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaning_mode: Option<CleaningMode>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_window_ms() -> u64 {
    2000
}

fn default_base_url() -> String {
    "http://homeassistant.local:8123".to_string()
}

fn default_service_domain() -> String {
    "dreame_vacuum".to_string()
}

fn default_stop_timeout() -> u64 {
    15
}

fn default_ack_timeout() -> u64 {
    10
}

fn default_listen() -> String {
    "127.0.0.1:8321".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            anchor: WindowAnchor::default(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            entity_id: String::new(),
            service_domain: default_service_domain(),
            stop_timeout_secs: default_stop_timeout(),
            ack_timeout_secs: default_ack_timeout(),
            test_mode: false,
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Config {
    /// Default configuration file location (~/.sweepd/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;
        Ok(home.join(".sweepd").join("config.toml"))
    }

    /// Load configuration from the default location.
    ///
    /// Unlike most daemons there is no usable default configuration: a zone
    /// table is mandatory, so a missing file is an error rather than a
    /// trigger for writing one.
    pub fn load_default() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            return Err(EngineError::Config(format!(
                "No configuration found at {}; create it or pass --config",
                config_path.display()
            )));
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the loaded configuration.
    ///
    /// Everything checked here is fatal at startup and can therefore never
    /// fail at runtime: the zone table, the window duration, the timeout
    /// budgets, and the device coordinates (unless test mode substitutes
    /// the recorder).
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.zones.is_empty() {
            return Err(EngineError::Config(
                "At least one zone must be configured".to_string(),
            ));
        }

        for (id, zone) in &self.zones {
            if zone.segments.is_empty() {
                return Err(EngineError::Config(format!(
                    "Zone '{}' has no segments",
                    id
                )));
            }
            if zone.segments.iter().any(|segment| *segment == 0) {
                return Err(EngineError::Config(format!(
                    "Zone '{}' contains segment id 0; segment ids are positive",
                    id
                )));
            }
        }

        if self.grouping.window_ms == 0 {
            return Err(EngineError::Config(
                "grouping.window_ms must be greater than zero".to_string(),
            ));
        }

        if self.device.stop_timeout_secs == 0 || self.device.ack_timeout_secs == 0 {
            return Err(EngineError::Config(
                "Device timeouts must be greater than zero".to_string(),
            ));
        }

        self.intake.listen.parse::<SocketAddr>().map_err(|e| {
            EngineError::Config(format!(
                "intake.listen '{}' is not a valid socket address: {}",
                self.intake.listen, e
            ))
        })?;

        if !self.device.test_mode {
            if self.device.entity_id.is_empty() {
                return Err(EngineError::Config(
                    "device.entity_id is required unless device.test_mode is set".to_string(),
                ));
            }
            if self.device.token.is_empty() {
                return Err(EngineError::Config(
                    "device.token is required unless device.test_mode is set".to_string(),
                ));
            }
        }

        Ok(())
    }
}
