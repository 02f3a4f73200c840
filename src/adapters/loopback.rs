//! Loopback transport.
//!
//! A [`SerialTransport`] with no radio: it "discovers" a fixed device list
//! and, once connected, forwards whatever is written to its
//! [`LoopbackFeeder`] as inbound bytes.  Used by the replay tool to push a
//! captured stream through the real session and decoder.

use std::sync::{Arc, Mutex};

use log::debug;

use crate::link::channels::InboundSink;
use crate::link::registry::DeviceDescriptor;
use crate::link::transport::SerialTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopbackError {
    /// `list` before `enable`.
    Disabled,
    /// Connect to an id not in the device list.
    UnknownDevice,
}

impl core::fmt::Display for LoopbackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Disabled => write!(f, "radio not enabled"),
            Self::UnknownDevice => write!(f, "unknown device"),
        }
    }
}

type Slot = Arc<Mutex<Option<InboundSink>>>;

pub struct LoopbackTransport {
    devices: Vec<DeviceDescriptor>,
    enabled: bool,
    inbound: Slot,
}

impl LoopbackTransport {
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self {
            devices,
            enabled: false,
            inbound: Arc::new(Mutex::new(None)),
        }
    }

    /// Write side of the loopback.  May be moved to another thread.
    pub fn feeder(&self) -> LoopbackFeeder {
        LoopbackFeeder {
            inbound: Arc::clone(&self.inbound),
        }
    }

    fn store(&self, sink: Option<InboundSink>) {
        if let Ok(mut slot) = self.inbound.lock() {
            *slot = sink;
        }
    }
}

impl SerialTransport for LoopbackTransport {
    type Error = LoopbackError;

    async fn enable(&mut self) -> Result<(), LoopbackError> {
        self.enabled = true;
        Ok(())
    }

    async fn list(&mut self) -> Result<Vec<DeviceDescriptor>, LoopbackError> {
        if !self.enabled {
            return Err(LoopbackError::Disabled);
        }
        Ok(self.devices.clone())
    }

    async fn connect(&mut self, device_id: &str, inbound: InboundSink) -> Result<(), LoopbackError> {
        if !self.devices.iter().any(|d| d.id == device_id) {
            return Err(LoopbackError::UnknownDevice);
        }
        debug!("Loopback: attached {}", device_id);
        self.store(Some(inbound));
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), LoopbackError> {
        self.store(None);
        Ok(())
    }
}

/// Pushes bytes into the connected session.
#[derive(Clone)]
pub struct LoopbackFeeder {
    inbound: Slot,
}

impl LoopbackFeeder {
    /// Deliver `bytes`.  Returns `false` when nothing is connected.
    pub fn write(&self, bytes: &[u8]) -> bool {
        match self.inbound.lock() {
            Ok(slot) => slot.as_ref().is_some_and(|sink| sink.deliver(bytes)),
            Err(_) => false,
        }
    }
}
