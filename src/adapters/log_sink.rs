//! Log-based adapters.
//!
//! [`LogEventSink`] implements [`EventSink`] by writing structured monitor
//! events to the `log` facade; [`LogActuator`] implements [`ActuatorPort`]
//! for hosts without a physical pump relay (the replay tool, bench
//! setups).  A UI store or relay driver would implement the same traits.

use log::{error, info, warn};

use crate::app::events::MonitorEvent;
use crate::app::ports::{ActuatorPort, EventSink};
use crate::link::session::ConnectionState;

/// Adapter that logs every [`MonitorEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: u64,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events written so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &MonitorEvent) {
        self.emitted += 1;
        match event {
            MonitorEvent::DevicesDiscovered(n) => {
                info!("SCAN  | {} devices", n);
            }
            MonitorEvent::ConnectionChanged(state) => match state {
                ConnectionState::Disconnected => info!("LINK  | disconnected"),
                ConnectionState::Connecting(d) => info!("LINK  | connecting to {}", d),
                ConnectionState::Connected(d) => info!("LINK  | connected to {}", d),
            },
            MonitorEvent::DisconnectedFrom(d) => {
                info!("LINK  | disconnected from: {}", d.label());
            }
            MonitorEvent::TransportFailure(msg) => {
                warn!("LINK  | {}", msg);
            }
            MonitorEvent::TelegramReceived(t) => {
                info!("TELEG | {:?} {:?}", t.schema(), t.values());
            }
            MonitorEvent::ControlUpdated(s) => {
                info!(
                    "CTRL  | pump={} alarm={:?} | {}",
                    if s.pump_on { "ON" } else { "OFF" },
                    s.alarm,
                    s.status
                );
            }
            MonitorEvent::AlarmRaised { reading } => {
                error!(
                    "ALARM | dissolved oxygen {:.2} (reading #{})",
                    reading.value, reading.observed_at
                );
            }
            MonitorEvent::AlarmReset => {
                info!("ALARM | reset");
            }
            MonitorEvent::InvalidReading(msg) => {
                warn!("CTRL  | {}", msg);
            }
        }
    }
}

/// Actuator that only records and logs what it is told.
#[derive(Debug, Default)]
pub struct LogActuator {
    pump_on: bool,
    alarms: u32,
}

impl LogActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pump_on(&self) -> bool {
        self.pump_on
    }

    /// Alerts raised so far.
    pub fn alarms(&self) -> u32 {
        self.alarms
    }
}

impl ActuatorPort for LogActuator {
    fn set_pump(&mut self, on: bool) {
        if on != self.pump_on {
            info!("PUMP  | {}", if on { "ON" } else { "OFF" });
        }
        self.pump_on = on;
    }

    fn raise_alarm(&mut self, message: &str) {
        self.alarms += 1;
        error!("ALERT | {}", message);
    }
}
