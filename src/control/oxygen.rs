//! Oxygen control loop.
//!
//! Two thresholds split the reading range into three bands:
//!
//! ```text
//!   value <  critical            pump ON,  alarm latches   (Critical)
//!   critical <= value < warning  pump ON                   (Regulating)
//!   value >= warning             pump OFF                  (Stable)
//! ```
//!
//! The alarm is latching: once triggered it stays triggered through any
//! number of recoveries until an operator calls
//! [`ControlLoop::reset_alarm`].  The pump follows every reading.

use core::fmt;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use super::reading::OxygenReading;
use crate::config::ControlConfig;
use crate::error::{ConfigError, ControlError};

/// Operator alert text used when the alarm latches.
pub const CRITICAL_ALERT: &str = "Oxygen level dangerously low! Immediate action required.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmState {
    #[default]
    Armed,
    Triggered,
}

/// Human-readable status line for the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlStatus {
    #[default]
    Idle,
    Stable,
    Regulating,
    Critical,
    AlarmReset,
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "awaiting reading",
            Self::Stable => "stable",
            Self::Regulating => "low, pump regulating",
            Self::Critical => "critical",
            Self::AlarmReset => "alarm reset",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub pump_on: bool,
    pub alarm: AlarmState,
    pub status: ControlStatus,
}

/// Outcome of one [`ControlLoop::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub state: ControlState,
    /// The alarm went `Armed -> Triggered` on this reading.  The caller
    /// should alert the operator exactly when this is set.
    pub alarm_raised: bool,
}

pub struct ControlLoop {
    critical: f32,
    warning: f32,
    state: ControlState,
    last_reading: Option<OxygenReading>,
}

impl ControlLoop {
    /// Build a loop from `config`.  Thresholds that are not finite, or that
    /// leave no regulating band, are rejected.
    pub fn new(config: ControlConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            critical: config.critical_threshold,
            warning: config.warning_threshold,
            state: ControlState::default(),
            last_reading: None,
        })
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn last_reading(&self) -> Option<OxygenReading> {
        self.last_reading
    }

    /// Apply one reading.  Non-finite values are rejected and leave the
    /// state untouched.
    pub fn evaluate(&mut self, reading: OxygenReading) -> Result<Evaluation, ControlError> {
        let value = reading.value;
        if !value.is_finite() {
            warn!("Control: rejecting non-finite reading {}", value);
            return Err(ControlError::InvalidReading(value.to_string()));
        }

        let mut alarm_raised = false;
        let prev = self.state;

        if value < self.critical {
            self.state.pump_on = true;
            self.state.status = ControlStatus::Critical;
            if self.state.alarm == AlarmState::Armed {
                self.state.alarm = AlarmState::Triggered;
                alarm_raised = true;
                error!(
                    "Control: ALARM dissolved oxygen {:.2} below critical {:.2}",
                    value, self.critical
                );
            }
        } else if value < self.warning {
            self.state.pump_on = true;
            self.state.status = ControlStatus::Regulating;
        } else {
            self.state.pump_on = false;
            self.state.status = ControlStatus::Stable;
        }

        if prev.pump_on != self.state.pump_on {
            info!(
                "Control: pump {} at {:.2}",
                if self.state.pump_on { "ON" } else { "OFF" },
                value
            );
        }
        debug!(
            "Control: reading #{} = {:.2} -> {}",
            reading.observed_at, value, self.state.status
        );

        self.last_reading = Some(reading);
        Ok(Evaluation {
            state: self.state,
            alarm_raised,
        })
    }

    /// Re-arm the alarm.  The pump keeps its last commanded state; only the
    /// next reading changes it.
    pub fn reset_alarm(&mut self) -> ControlState {
        if self.state.alarm == AlarmState::Triggered {
            info!("Control: alarm reset by operator");
        }
        self.state.alarm = AlarmState::Armed;
        self.state.status = ControlStatus::AlarmReset;
        self.state
    }
}
