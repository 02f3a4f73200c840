//! Inbound commands to the monitor service.
//!
//! These represent operator actions from the UI (buttons, pickers, text
//! fields) that the [`MonitorService`](super::service::MonitorService)
//! interprets and acts upon.

use crate::link::telegram::TelegramSchema;
use crate::prediction::PredictionFeature;

/// Commands the UI can send into the monitor core.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorCommand {
    /// Enable the radio and refresh the device list.
    Discover,

    /// Pick a device from the list without connecting.
    Select(String),

    /// Connect to the device with this id.
    Connect(String),

    /// Connect to the previously selected device.
    ConnectSelected,

    /// Close the connection (or cancel a pending one).
    Disconnect,

    /// Re-arm the latched alarm.
    ResetAlarm,

    /// Operator typed an oxygen value.
    ManualReading(String),

    /// Switch the expected telegram shape (screen change).
    SetSchema(TelegramSchema),

    /// Operator typed a prediction form field.
    SetFeature(PredictionFeature, String),
}
