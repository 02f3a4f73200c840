//! Monitor service: the hexagonal core.
//!
//! [`MonitorService`] owns the telemetry session, device registry, oxygen
//! control loop and prediction form.  It exposes a platform-agnostic API;
//! all I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//! SerialTransport ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                     │      MonitorService      │
//!    ActuatorPort ◀── │ Session · Control · Form │
//!                     └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::MonitorConfig;
use crate::control::{ControlLoop, ControlState, OxygenReading, CRITICAL_ALERT};
use crate::error::{ConfigError, RegistryError, Result};
use crate::link::registry::{DeviceDescriptor, DeviceRegistry};
use crate::link::session::{ConnectionState, TelemetrySession};
use crate::link::telegram::{Telegram, TelegramSchema};
use crate::link::transport::SerialTransport;
use crate::prediction::{PredictionFeature, PredictionForm, PredictionRequest};

use super::commands::MonitorCommand;
use super::events::{MonitorEvent, MonitorSnapshot};
use super::ports::{ActuatorPort, EventSink};

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

pub struct MonitorService<T: SerialTransport> {
    session: TelemetrySession<T>,
    registry: DeviceRegistry,
    control: ControlLoop,
    form: PredictionForm,
    /// Sequence number handed to the next reading.
    sequence: u64,
}

impl<T: SerialTransport> MonitorService<T> {
    /// Construct the service.  Fails if `config` does not validate.
    pub fn new(config: MonitorConfig, transport: T) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "MonitorService: thresholds critical={} warning={}, schema {:?}",
            config.control.critical_threshold, config.control.warning_threshold, config.link.schema
        );
        Ok(Self {
            session: TelemetrySession::new(transport, &config.link),
            registry: DeviceRegistry::new(),
            control: ControlLoop::new(config.control)?,
            form: PredictionForm::new(),
            sequence: 0,
        })
    }

    // ── Devices ───────────────────────────────────────────────

    /// Refresh the device list.  Returns the number of devices found.
    pub async fn discover(&mut self, sink: &mut impl EventSink) -> Result<usize> {
        match self.session.discover().await {
            Ok(devices) => {
                self.registry.replace(devices);
                let n = self.registry.len();
                info!("MonitorService: {} devices discovered", n);
                sink.emit(&MonitorEvent::DevicesDiscovered(n));
                Ok(n)
            }
            Err(e) => {
                sink.emit(&MonitorEvent::TransportFailure(e.to_string()));
                Err(e.into())
            }
        }
    }

    pub fn select_device(&mut self, id: &str) -> Result<DeviceDescriptor> {
        Ok(self.registry.select(id)?)
    }

    pub fn devices(&self) -> &[DeviceDescriptor] {
        self.registry.list()
    }

    // ── Connection ────────────────────────────────────────────

    /// Select `id` from the device list and connect to it.
    pub async fn connect(&mut self, id: &str, sink: &mut impl EventSink) -> Result<()> {
        self.session.ensure_idle()?;
        let target = self.registry.select(id)?;
        self.open(target, sink).await
    }

    /// Connect to the device picked earlier with [`select_device`](Self::select_device).
    pub async fn connect_selected(&mut self, sink: &mut impl EventSink) -> Result<()> {
        self.session.ensure_idle()?;
        let target = self
            .registry
            .selected()
            .cloned()
            .ok_or(RegistryError::NoSelection)?;
        self.open(target, sink).await
    }

    async fn open(&mut self, target: DeviceDescriptor, sink: &mut impl EventSink) -> Result<()> {
        sink.emit(&MonitorEvent::ConnectionChanged(ConnectionState::Connecting(
            target.clone(),
        )));
        let result = self.session.connect(target).await;
        if let Err(e) = &result {
            sink.emit(&MonitorEvent::TransportFailure(e.to_string()));
        }
        sink.emit(&MonitorEvent::ConnectionChanged(self.session.state().clone()));
        result.map_err(Into::into)
    }

    /// Close the connection, or cancel a pending one.  A no-op when already
    /// disconnected.
    pub async fn disconnect(&mut self, sink: &mut impl EventSink) -> Result<()> {
        let was = self.session.state().clone();
        let result = self.session.disconnect().await;

        if was != ConnectionState::Disconnected {
            sink.emit(&MonitorEvent::ConnectionChanged(ConnectionState::Disconnected));
        }
        if let ConnectionState::Connected(device) = was {
            sink.emit(&MonitorEvent::DisconnectedFrom(device));
        }
        if let Err(e) = result {
            sink.emit(&MonitorEvent::TransportFailure(e.to_string()));
            return Err(e.into());
        }
        Ok(())
    }

    /// Switch the expected telegram shape.
    pub fn set_schema(&mut self, schema: TelegramSchema) {
        self.session.set_schema(schema);
    }

    // ── Inbound telemetry ─────────────────────────────────────

    /// Process every chunk queued on the link.  Returns the number of
    /// telegrams handled.
    pub fn poll_link(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) -> usize {
        let mut telegrams: Vec<Telegram> = Vec::new();
        self.session.drain(&mut |t: Telegram| telegrams.push(t));
        self.dispatch(telegrams, hw, sink)
    }

    /// Wait for the link to deliver, then process everything queued.
    pub async fn next_link_event(
        &mut self,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut telegrams: Vec<Telegram> = Vec::new();
        self.session.next(&mut |t: Telegram| telegrams.push(t)).await;
        self.dispatch(telegrams, hw, sink)
    }

    fn dispatch(
        &mut self,
        telegrams: Vec<Telegram>,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> usize {
        let n = telegrams.len();
        for telegram in telegrams {
            self.form.apply_telegram(&telegram);
            let oxygen = telegram.dissolved_oxygen();
            sink.emit(&MonitorEvent::TelegramReceived(telegram));
            if let Some(value) = oxygen {
                let reading = self.next_reading(value);
                // Telegram fields are finite, so this cannot be rejected.
                let _ = self.apply_reading(reading, hw, sink);
            }
        }
        n
    }

    // ── Operator actions ──────────────────────────────────────

    /// Evaluate a value typed by the operator.
    pub fn manual_reading(
        &mut self,
        text: &str,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<ControlState> {
        match OxygenReading::parse_manual(text, self.sequence) {
            Ok(reading) => {
                self.sequence += 1;
                self.apply_reading(reading, hw, sink)
            }
            Err(e) => {
                warn!("MonitorService: {}", e);
                sink.emit(&MonitorEvent::InvalidReading(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Re-arm the latched alarm.  The pump is left as it is.
    pub fn reset_alarm(&mut self, sink: &mut impl EventSink) -> ControlState {
        let state = self.control.reset_alarm();
        sink.emit(&MonitorEvent::AlarmReset);
        sink.emit(&MonitorEvent::ControlUpdated(state));
        state
    }

    pub fn set_feature(&mut self, feature: PredictionFeature, text: &str) -> Result<()> {
        Ok(self.form.set(feature, text)?)
    }

    /// Request body for the classifier, if the form is complete.
    pub fn prediction_request(&self) -> Result<PredictionRequest> {
        Ok(self.form.to_request()?)
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an operator command from the UI.
    pub async fn handle_command(
        &mut self,
        cmd: MonitorCommand,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            MonitorCommand::Discover => self.discover(sink).await.map(|_| ()),
            MonitorCommand::Select(id) => self.select_device(&id).map(|_| ()),
            MonitorCommand::Connect(id) => self.connect(&id, sink).await,
            MonitorCommand::ConnectSelected => self.connect_selected(sink).await,
            MonitorCommand::Disconnect => self.disconnect(sink).await,
            MonitorCommand::ResetAlarm => {
                self.reset_alarm(sink);
                Ok(())
            }
            MonitorCommand::ManualReading(text) => {
                self.manual_reading(&text, hw, sink).map(|_| ())
            }
            MonitorCommand::SetSchema(schema) => {
                self.set_schema(schema);
                Ok(())
            }
            MonitorCommand::SetFeature(feature, text) => self.set_feature(feature, &text),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            connection: self.session.state().clone(),
            control: self.control.state(),
            last_reading: self.control.last_reading(),
            devices: self.registry.list().to_vec(),
            selected: self.registry.selected().cloned(),
            schema: self.session.schema(),
            dropped_frames: self.session.dropped_frames(),
            form: self.form,
        }
    }

    pub fn connection(&self) -> &ConnectionState {
        self.session.state()
    }

    pub fn control_state(&self) -> ControlState {
        self.control.state()
    }

    pub fn form(&self) -> &PredictionForm {
        &self.form
    }

    pub fn transport(&self) -> &T {
        self.session.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.session.transport_mut()
    }

    // ── Internal ──────────────────────────────────────────────

    fn next_reading(&mut self, value: f32) -> OxygenReading {
        let reading = OxygenReading::new(value, self.sequence);
        self.sequence += 1;
        reading
    }

    /// Run one reading through the control loop and apply the decision.
    fn apply_reading(
        &mut self,
        reading: OxygenReading,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<ControlState> {
        let eval = match self.control.evaluate(reading) {
            Ok(eval) => eval,
            Err(e) => {
                sink.emit(&MonitorEvent::InvalidReading(e.to_string()));
                return Err(e.into());
            }
        };

        hw.set_pump(eval.state.pump_on);
        if eval.alarm_raised {
            hw.raise_alarm(CRITICAL_ALERT);
            sink.emit(&MonitorEvent::AlarmRaised { reading });
        }
        sink.emit(&MonitorEvent::ControlUpdated(eval.state));
        Ok(eval.state)
    }
}
