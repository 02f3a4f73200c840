//! Oxygen regulation: readings in, pump and alarm decisions out.

pub mod oxygen;
pub mod reading;

pub use oxygen::{AlarmState, ControlLoop, ControlState, ControlStatus, Evaluation, CRITICAL_ALERT};
pub use reading::OxygenReading;
