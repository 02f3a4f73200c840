//! Dissolved-oxygen readings.

use serde::{Deserialize, Serialize};

use crate::error::ControlError;

/// One dissolved-oxygen sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OxygenReading {
    pub value: f32,
    /// Logical sequence number, monotonic per service.
    pub observed_at: u64,
}

impl OxygenReading {
    pub fn new(value: f32, observed_at: u64) -> Self {
        Self { value, observed_at }
    }

    /// Validate operator input from the manual-entry field.
    pub fn parse_manual(text: &str, observed_at: u64) -> Result<Self, ControlError> {
        let trimmed = text.trim();
        trimmed
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|value| Self::new(value, observed_at))
            .ok_or_else(|| ControlError::InvalidReading(trimmed.to_owned()))
    }
}
