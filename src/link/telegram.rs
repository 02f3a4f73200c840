//! Sensor telegram schemas.
//!
//! A telegram is one comma-separated line of decimal numbers bound
//! positionally to sensor channels.  Two shapes are in use, one per
//! consumer screen:
//!
//! | Schema          | Fields                                        |
//! |-----------------|-----------------------------------------------|
//! | `OxygenMonitor` | `TDS, Hardness, Salinity, DissolvedOxygen, pH` |
//! | `Prediction`    | `TDS, Hardness, Salinity, pH`                  |
//!
//! Parsing is all-or-nothing: a frame with the wrong arity or any field
//! that is not a finite number yields an error and no telegram.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use super::codec::RawFrame;
use crate::error::FrameError;

/// Widest schema in use.
pub const MAX_FIELDS: usize = 5;

/// Named sensor channel carried by a telegram field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorChannel {
    Tds,
    Hardness,
    Salinity,
    DissolvedOxygen,
    Ph,
}

const OXYGEN_MONITOR_LAYOUT: &[SensorChannel] = &[
    SensorChannel::Tds,
    SensorChannel::Hardness,
    SensorChannel::Salinity,
    SensorChannel::DissolvedOxygen,
    SensorChannel::Ph,
];

const PREDICTION_LAYOUT: &[SensorChannel] = &[
    SensorChannel::Tds,
    SensorChannel::Hardness,
    SensorChannel::Salinity,
    SensorChannel::Ph,
];

/// Field layout expected on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelegramSchema {
    /// Five fields, feeds the oxygen control loop.
    #[default]
    OxygenMonitor,
    /// Four fields, feeds the prediction form only.
    Prediction,
}

impl TelegramSchema {
    /// Channels in wire order.
    pub fn layout(self) -> &'static [SensorChannel] {
        match self {
            Self::OxygenMonitor => OXYGEN_MONITOR_LAYOUT,
            Self::Prediction => PREDICTION_LAYOUT,
        }
    }

    pub fn arity(self) -> usize {
        self.layout().len()
    }

    /// Parse one delimited frame.
    pub fn parse(self, frame: &RawFrame) -> Result<Telegram, FrameError> {
        let text = core::str::from_utf8(frame.as_bytes()).map_err(|_| FrameError::NotUtf8)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(FrameError::Empty);
        }

        let found = text.split(',').count();
        if found != self.arity() {
            return Err(FrameError::Arity {
                expected: self.arity(),
                found,
            });
        }

        let mut values = Vec::new();
        for (index, field) in text.split(',').enumerate() {
            let value = field
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(FrameError::BadField { index })?;
            values.push(value).map_err(|_| FrameError::Arity {
                expected: self.arity(),
                found,
            })?;
        }

        Ok(Telegram {
            schema: self,
            values,
        })
    }
}

/// One decoded, validated sensor record.
#[derive(Debug, Clone, PartialEq)]
pub struct Telegram {
    schema: TelegramSchema,
    values: Vec<f32, MAX_FIELDS>,
}

impl Telegram {
    pub fn schema(&self) -> TelegramSchema {
        self.schema
    }

    /// Field values in wire order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value of `channel`, if this schema carries it.
    pub fn get(&self, channel: SensorChannel) -> Option<f32> {
        self.schema
            .layout()
            .iter()
            .position(|c| *c == channel)
            .and_then(|i| self.values.get(i).copied())
    }

    pub fn dissolved_oxygen(&self) -> Option<f32> {
        self.get(SensorChannel::DissolvedOxygen)
    }
}
