//! Transport abstraction for the serial-over-radio binding.
//!
//! The platform binding (Bluetooth serial on the phone, a loopback in the
//! replay tool, a mock in tests) implements [`SerialTransport`].  The core
//! only relies on these four operations plus the chunk delivery handle
//! ([`InboundSink`]) passed to `connect`; it knows nothing about pairing,
//! RSSI or MTUs.
//!
//! All operations are async: the binding may suspend while the radio works.
//! The [`TelemetrySession`](super::session::TelemetrySession) never has more
//! than one of them in flight.

use super::channels::InboundSink;
use super::registry::DeviceDescriptor;

/// Byte-stream transport to a single remote device at a time.
#[allow(async_fn_in_trait)]
pub trait SerialTransport {
    /// Error type for this transport.
    type Error: core::fmt::Display;

    /// Power up / enable the radio.
    async fn enable(&mut self) -> Result<(), Self::Error>;

    /// One discovery snapshot, in whatever order the radio reports.
    async fn list(&mut self) -> Result<Vec<DeviceDescriptor>, Self::Error>;

    /// Open a connection to `device_id`.  Every inbound byte chunk must be
    /// handed to `inbound` in arrival order until `disconnect` is called.
    async fn connect(&mut self, device_id: &str, inbound: InboundSink) -> Result<(), Self::Error>;

    /// Close the current connection (if any) and drop the inbound handle.
    async fn disconnect(&mut self) -> Result<(), Self::Error>;
}

/// A transport with no radio behind it: discovery finds nothing and every
/// connect is refused.  Useful as a default before a binding is attached.
pub struct NullTransport;

impl SerialTransport for NullTransport {
    type Error = &'static str;

    async fn enable(&mut self) -> Result<(), &'static str> {
        Ok(())
    }

    async fn list(&mut self) -> Result<Vec<DeviceDescriptor>, &'static str> {
        Ok(Vec::new())
    }

    async fn connect(&mut self, _device_id: &str, _inbound: InboundSink) -> Result<(), &'static str> {
        Err("no transport attached")
    }

    async fn disconnect(&mut self) -> Result<(), &'static str> {
        Ok(())
    }
}
