//! Port traits: the hexagonal boundary between the monitor core and the
//! host application.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (pump relay, alert banner, event sinks) implement these
//! traits.  The [`MonitorService`](super::service::MonitorService) takes
//! them at call sites, so the domain core never touches the platform
//! directly.  The byte transport is the third port and lives next to the
//! session as [`SerialTransport`](crate::link::transport::SerialTransport).

use super::events::MonitorEvent;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → pump / operator alert)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command the aerator pump and
/// to alert the operator.
pub trait ActuatorPort {
    /// Switch the pump.  Called after every evaluated reading, so
    /// implementations must tolerate repeated identical commands.
    fn set_pump(&mut self, on: bool);

    /// Alert the operator (vibration, modal, siren...).  Called once per
    /// latch of the alarm.
    fn raise_alarm(&mut self, message: &str);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → UI / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`MonitorEvent`]s through this port.
/// Adapters decide where they go (UI state store, log, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &MonitorEvent);
}
