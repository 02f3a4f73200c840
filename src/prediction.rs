//! Water-quality prediction form.
//!
//! Collects the eight features the remote classifier expects, either typed
//! by the operator or filled from incoming telegrams, and turns them into
//! the request body.  The HTTP round-trip itself belongs to the host app;
//! this module only builds the request and interprets the verdict.

use core::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::PredictionError;
use crate::link::telegram::{SensorChannel, Telegram};

/// Classifier input feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredictionFeature {
    Ph,
    Co3,
    Salinity,
    Hco3,
    Alkalinity,
    Hardness,
    CaMgRatio,
    DissolvedOxygen,
}

impl PredictionFeature {
    pub const ALL: [Self; 8] = [
        Self::Ph,
        Self::Co3,
        Self::Salinity,
        Self::Hco3,
        Self::Alkalinity,
        Self::Hardness,
        Self::CaMgRatio,
        Self::DissolvedOxygen,
    ];

    /// Key used by the classifier.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ph => "pH",
            Self::Co3 => "CO3",
            Self::Salinity => "Salinity",
            Self::Hco3 => "HCO3",
            Self::Alkalinity => "Alkalinity",
            Self::Hardness => "Hardness",
            Self::CaMgRatio => "Ca:Mg Ratio",
            Self::DissolvedOxygen => "Dissolved Oxygen",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Feature fed by a telegram channel.  TDS has no counterpart.
    fn from_channel(channel: SensorChannel) -> Option<Self> {
        match channel {
            SensorChannel::Hardness => Some(Self::Hardness),
            SensorChannel::Salinity => Some(Self::Salinity),
            SensorChannel::DissolvedOxygen => Some(Self::DissolvedOxygen),
            SensorChannel::Ph => Some(Self::Ph),
            SensorChannel::Tds => None,
        }
    }
}

/// Partially filled classifier input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PredictionForm {
    values: [Option<f32>; 8],
}

impl PredictionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operator entry.  Empty text clears the field.
    pub fn set(&mut self, feature: PredictionFeature, text: &str) -> Result<(), PredictionError> {
        let text = text.trim();
        if text.is_empty() {
            self.values[feature.index()] = None;
            return Ok(());
        }
        let value = text
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(PredictionError::InvalidValue(feature.name()))?;
        self.values[feature.index()] = Some(value);
        Ok(())
    }

    pub fn set_value(&mut self, feature: PredictionFeature, value: f32) -> Result<(), PredictionError> {
        if !value.is_finite() {
            return Err(PredictionError::InvalidValue(feature.name()));
        }
        self.values[feature.index()] = Some(value);
        Ok(())
    }

    pub fn get(&self, feature: PredictionFeature) -> Option<f32> {
        self.values[feature.index()]
    }

    /// Copy every mapped channel of `telegram` into the form.  Returns the
    /// number of fields updated.
    pub fn apply_telegram(&mut self, telegram: &Telegram) -> usize {
        let mut updated = 0;
        for (channel, value) in telegram.schema().layout().iter().zip(telegram.values()) {
            if let Some(feature) = PredictionFeature::from_channel(*channel) {
                self.values[feature.index()] = Some(*value);
                updated += 1;
            }
        }
        debug!("Prediction: {} fields filled from telegram", updated);
        updated
    }

    /// Features still without a value, in classifier order.
    pub fn missing(&self) -> impl Iterator<Item = PredictionFeature> + '_ {
        PredictionFeature::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
    }

    pub fn is_complete(&self) -> bool {
        self.missing().next().is_none()
    }

    pub fn clear(&mut self) {
        self.values = [None; 8];
    }

    /// Build the request body.  Fails on the first missing feature.
    pub fn to_request(&self) -> Result<PredictionRequest, PredictionError> {
        let v = |f: PredictionFeature| self.get(f).ok_or(PredictionError::Missing(f.name()));
        Ok(PredictionRequest {
            ph: v(PredictionFeature::Ph)?,
            co3: v(PredictionFeature::Co3)?,
            salinity: v(PredictionFeature::Salinity)?,
            hco3: v(PredictionFeature::Hco3)?,
            alkalinity: v(PredictionFeature::Alkalinity)?,
            hardness: v(PredictionFeature::Hardness)?,
            ca_mg_ratio: v(PredictionFeature::CaMgRatio)?,
            dissolved_oxygen: v(PredictionFeature::DissolvedOxygen)?,
        })
    }
}

/// JSON body sent to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "pH")]
    pub ph: f32,
    #[serde(rename = "CO3")]
    pub co3: f32,
    #[serde(rename = "Salinity")]
    pub salinity: f32,
    #[serde(rename = "HCO3")]
    pub hco3: f32,
    #[serde(rename = "Alkalinity")]
    pub alkalinity: f32,
    #[serde(rename = "Hardness")]
    pub hardness: f32,
    #[serde(rename = "Ca:Mg Ratio")]
    pub ca_mg_ratio: f32,
    #[serde(rename = "Dissolved Oxygen")]
    pub dissolved_oxygen: f32,
}

impl PredictionRequest {
    pub fn to_json(&self) -> String {
        // A struct of plain floats always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// JSON body returned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: i64,
}

impl PredictionResponse {
    pub fn verdict(&self) -> Result<WaterQuality, PredictionError> {
        match self.prediction {
            1 => Ok(WaterQuality::Optimal),
            0 => Ok(WaterQuality::NotOptimal),
            other => Err(PredictionError::UnknownVerdict(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterQuality {
    Optimal,
    NotOptimal,
}

impl fmt::Display for WaterQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Optimal => "Optimal Water Quality for Aquaculture.",
            Self::NotOptimal => "Not Optimal Water Quality for Aquaculture.",
        })
    }
}
