//! Outbound monitor events and the UI snapshot.
//!
//! The [`MonitorService`](super::service::MonitorService) emits events
//! through the [`EventSink`](super::ports::EventSink) port as things
//! happen; [`MonitorSnapshot`] is the read-only view a UI renders from.

use crate::control::{ControlState, OxygenReading};
use crate::link::registry::DeviceDescriptor;
use crate::link::session::ConnectionState;
use crate::link::telegram::{Telegram, TelegramSchema};
use crate::prediction::PredictionForm;

/// Structured events emitted by the monitor core.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// A discovery snapshot replaced the device list (carries its size).
    DevicesDiscovered(usize),

    /// The session moved to a new connection state.
    ConnectionChanged(ConnectionState),

    /// An established connection was closed by the operator.
    DisconnectedFrom(DeviceDescriptor),

    /// A transport operation failed; the text is suitable for a toast.
    TransportFailure(String),

    /// A validated telegram arrived on the link.
    TelegramReceived(Telegram),

    /// The control loop produced a new state.
    ControlUpdated(ControlState),

    /// The alarm latched on this reading.
    AlarmRaised { reading: OxygenReading },

    /// The operator re-armed the alarm.
    AlarmReset,

    /// Manual entry was rejected.
    InvalidReading(String),
}

/// Point-in-time copy of everything the UI shows.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSnapshot {
    pub connection: ConnectionState,
    pub control: ControlState,
    pub last_reading: Option<OxygenReading>,
    pub devices: Vec<DeviceDescriptor>,
    pub selected: Option<DeviceDescriptor>,
    pub schema: TelegramSchema,
    pub dropped_frames: u64,
    pub form: PredictionForm,
}

impl MonitorSnapshot {
    /// Status line as shown under the oxygen gauge.
    pub fn status_line(&self) -> String {
        match self.last_reading {
            Some(r) => format!("{:.2} ({})", r.value, self.control.status),
            None => self.control.status.to_string(),
        }
    }
}
