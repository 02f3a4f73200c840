//! System configuration parameters
//!
//! All tunable parameters for the telemetry core.  Values come from
//! [`MonitorConfig::default`] or a JSON document supplied by the host app;
//! either way they go through [`MonitorConfig::validate`] before use.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::link::codec::MAX_FRAME_SIZE;
use crate::link::telegram::TelegramSchema;

/// Smallest accepted frame cap.  A five-field telegram of short numbers
/// already needs ~15 bytes.
pub const MIN_FRAME_SIZE: usize = 16;

/// Oxygen control loop thresholds, in dissolved-oxygen units as reported by
/// the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Below this the pump runs and the alarm latches.
    #[serde(default = "default_critical")]
    pub critical_threshold: f32,
    /// Below this (and at or above critical) the pump regulates.
    #[serde(default = "default_warning")]
    pub warning_threshold: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            critical_threshold: default_critical(),
            warning_threshold: default_warning(),
        }
    }
}

impl ControlConfig {
    /// Thresholds must be finite and leave a non-empty regulating band.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.critical_threshold.is_finite() || !self.warning_threshold.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "thresholds must be finite numbers",
            ));
        }
        if self.critical_threshold >= self.warning_threshold {
            return Err(ConfigError::ValidationFailed(
                "critical_threshold must be below warning_threshold",
            ));
        }
        Ok(())
    }
}

/// Serial link parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Bytes allowed before a delimiter must appear.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Connect timeout in milliseconds (0 = wait for the transport).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u32,
    /// Telegram shape expected on the wire.
    #[serde(default)]
    pub schema: TelegramSchema,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
            connect_timeout_ms: default_connect_timeout_ms(),
            schema: TelegramSchema::default(),
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub link: LinkConfig,
}

fn default_critical() -> f32 {
    4.0
}
fn default_warning() -> f32 {
    7.0
}
fn default_max_frame_bytes() -> usize {
    256
}
fn default_connect_timeout_ms() -> u32 {
    10_000
}

impl MonitorConfig {
    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the control loop or decoder unsafe.
    /// Invalid ranges are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.control.validate()?;
        if !(MIN_FRAME_SIZE..=MAX_FRAME_SIZE).contains(&self.link.max_frame_bytes) {
            return Err(ConfigError::ValidationFailed(
                "max_frame_bytes out of range",
            ));
        }
        Ok(())
    }
}
