//! Mock adapters for integration tests.
//!
//! Records every transport, actuator and event call so tests can assert on
//! the full history without a radio or a pump.

use aquamon::app::events::MonitorEvent;
use aquamon::app::ports::{ActuatorPort, EventSink};
use aquamon::link::channels::InboundSink;
use aquamon::link::registry::DeviceDescriptor;
use aquamon::link::transport::SerialTransport;

// ── Transport call record ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Enable,
    List,
    Connect(String),
    Disconnect,
}

// ── MockTransport ─────────────────────────────────────────────

pub struct MockTransport {
    pub devices: Vec<DeviceDescriptor>,
    pub calls: Vec<TransportCall>,
    /// Every inbound handle ever handed out, oldest first.
    pub sinks: Vec<InboundSink>,
    pub refuse_connect: bool,
    /// `connect` never completes.
    pub hang_connect: bool,
    pub fail_enable: bool,
    pub fail_disconnect: bool,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self {
            devices,
            calls: Vec::new(),
            sinks: Vec::new(),
            refuse_connect: false,
            hang_connect: false,
            fail_enable: false,
            fail_disconnect: false,
        }
    }

    /// Two named stations and one anonymous one.
    pub fn stations() -> Self {
        Self::new(vec![
            DeviceDescriptor::new("98:D3:31:F5:0A:01", Some("Pond A")),
            DeviceDescriptor::new("98:D3:31:F5:0A:02", Some("Pond B")),
            DeviceDescriptor::new("98:D3:31:F5:0A:03", None),
        ])
    }

    /// Handle from the most recent connect.
    pub fn inbound(&self) -> &InboundSink {
        self.sinks.last().expect("no connect yet")
    }

    /// Deliver `bytes` through the most recent handle.
    pub fn push(&self, bytes: &[u8]) -> bool {
        self.inbound().deliver(bytes)
    }

    pub fn count(&self, call: &TransportCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn connects(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, TransportCall::Connect(_)))
            .count()
    }
}

impl SerialTransport for MockTransport {
    type Error = &'static str;

    async fn enable(&mut self) -> Result<(), &'static str> {
        self.calls.push(TransportCall::Enable);
        if self.fail_enable {
            return Err("bluetooth is off");
        }
        Ok(())
    }

    async fn list(&mut self) -> Result<Vec<DeviceDescriptor>, &'static str> {
        self.calls.push(TransportCall::List);
        Ok(self.devices.clone())
    }

    async fn connect(&mut self, device_id: &str, inbound: InboundSink) -> Result<(), &'static str> {
        self.calls.push(TransportCall::Connect(device_id.to_owned()));
        if self.hang_connect {
            futures_lite::future::pending::<()>().await;
        }
        if self.refuse_connect {
            return Err("connection refused");
        }
        self.sinks.push(inbound);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), &'static str> {
        self.calls.push(TransportCall::Disconnect);
        if self.fail_disconnect {
            return Err("socket already closed");
        }
        Ok(())
    }
}

// ── MockActuator ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    SetPump(bool),
    RaiseAlarm(String),
}

#[derive(Default)]
pub struct MockActuator {
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commanded pump state (off if never commanded).
    pub fn pump_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::SetPump(on) => Some(*on),
                ActuatorCall::RaiseAlarm(_) => None,
            })
            .unwrap_or(false)
    }

    pub fn alarms(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::RaiseAlarm(_)))
            .count()
    }
}

impl ActuatorPort for MockActuator {
    fn set_pump(&mut self, on: bool) {
        self.calls.push(ActuatorCall::SetPump(on));
    }

    fn raise_alarm(&mut self, message: &str) {
        self.calls.push(ActuatorCall::RaiseAlarm(message.to_owned()));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<MonitorEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&MonitorEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &MonitorEvent) {
        self.events.push(event.clone());
    }
}
