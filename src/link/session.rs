//! Telemetry session: connection lifecycle plus the decoded telegram stream.
//!
//! ```text
//!           connect(target)            transport Ok
//! Disconnected ─────────▶ Connecting ──────────────▶ Connected
//!      ▲                      │ refused / timeout          │
//!      └──────────────────────┴────────── disconnect() ◀───┘
//! ```
//!
//! A refused or timed-out connect also asks the transport to disconnect,
//! so a binding that completes the attempt late is not left open.
//!
//! Every transport operation takes `&mut self`, so connect, disconnect and
//! discovery can never overlap.  Inbound bytes arrive on the
//! [`channels`](super::channels) queue and are decoded only by the task that
//! owns the session, one chunk at a time.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::channels::{ChunkMsg, InboundLink};
use super::codec::TelegramDecoder;
use super::registry::DeviceDescriptor;
use super::telegram::{Telegram, TelegramSchema};
use super::transport::SerialTransport;
use crate::config::LinkConfig;
use crate::error::{SessionError, TransportOp};

/// Where the session stands with its one remote device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting(DeviceDescriptor),
    Connected(DeviceDescriptor),
}

impl ConnectionState {
    /// Device targeted by a pending or live connection.
    pub fn device(&self) -> Option<&DeviceDescriptor> {
        match self {
            Self::Disconnected => None,
            Self::Connecting(d) | Self::Connected(d) => Some(d),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

/// Receives telegrams in decode order.
pub trait TelegramSink {
    fn on_telegram(&mut self, telegram: Telegram);
}

impl<F: FnMut(Telegram)> TelegramSink for F {
    fn on_telegram(&mut self, telegram: Telegram) {
        self(telegram)
    }
}

pub struct TelemetrySession<T: SerialTransport> {
    transport: T,
    state: ConnectionState,
    decoder: TelegramDecoder,
    link: Arc<InboundLink>,
    generation: u32,
    connect_timeout: Option<Duration>,
}

impl<T: SerialTransport> TelemetrySession<T> {
    pub fn new(transport: T, config: &LinkConfig) -> Self {
        let connect_timeout = match config.connect_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(u64::from(ms))),
        };
        Self {
            transport,
            state: ConnectionState::Disconnected,
            decoder: TelegramDecoder::new(config.schema, config.max_frame_bytes),
            link: InboundLink::new(),
            generation: 0,
            connect_timeout,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn schema(&self) -> TelegramSchema {
        self.decoder.schema()
    }

    /// Malformed frames discarded over the session's lifetime.
    pub fn dropped_frames(&self) -> u64 {
        self.decoder.dropped()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Fails if a connect would be refused in the current state.
    pub fn ensure_idle(&self) -> Result<(), SessionError> {
        match &self.state {
            ConnectionState::Disconnected => Ok(()),
            ConnectionState::Connecting(d) => Err(SessionError::AlreadyConnecting(d.id.clone())),
            ConnectionState::Connected(d) => Err(SessionError::AlreadyConnected(d.id.clone())),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enable the radio and take one discovery snapshot.
    pub async fn discover(&mut self) -> Result<Vec<DeviceDescriptor>, SessionError> {
        if let ConnectionState::Connecting(d) = &self.state {
            return Err(SessionError::AlreadyConnecting(d.id.clone()));
        }
        self.transport
            .enable()
            .await
            .map_err(|e| SessionError::transport(TransportOp::Enable, e))?;
        let devices = self
            .transport
            .list()
            .await
            .map_err(|e| SessionError::transport(TransportOp::List, e))?;
        debug!("Session: discovery found {} devices", devices.len());
        Ok(devices)
    }

    /// Open a connection to `target`.
    ///
    /// If the returned future is dropped before completion the session stays
    /// `Connecting`; call [`disconnect`](Self::disconnect) to cancel.
    pub async fn connect(&mut self, target: DeviceDescriptor) -> Result<(), SessionError> {
        self.ensure_idle()?;

        self.generation = match self.generation.wrapping_add(1) {
            0 => 1,
            g => g,
        };
        self.decoder.reset();
        let inbound = self.link.open(self.generation);
        self.state = ConnectionState::Connecting(target.clone());
        info!("Session: connecting to {} (generation {})", target, self.generation);

        let transport = &mut self.transport;
        let id = target.id.as_str();
        let attempt = async move {
            transport
                .connect(id, inbound)
                .await
                .map_err(|e| SessionError::transport(TransportOp::Connect, e))
        };
        let result = match self.connect_timeout {
            Some(limit) => {
                futures_lite::future::or(attempt, async {
                    async_io_mini::Timer::after(limit).await;
                    Err(SessionError::transport(
                        TransportOp::Connect,
                        format!("timed out after {} ms", limit.as_millis()),
                    ))
                })
                .await
            }
            None => attempt.await,
        };

        match result {
            Ok(()) => {
                info!("Session: connected to {}", target);
                self.state = ConnectionState::Connected(target);
                Ok(())
            }
            Err(e) => {
                warn!("Session: {}", e);
                self.link.close();
                // The binding may hold a half-open socket or finish the
                // dropped attempt later.  The connect error wins.
                if let Err(d) = self.transport.disconnect().await {
                    warn!(
                        "Session: {}",
                        SessionError::transport(TransportOp::Disconnect, d)
                    );
                }
                self.state = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    /// Tear the connection down.  Returns the device that was connected, if
    /// any.  Local state is always reset, even when the transport reports a
    /// failure.
    pub async fn disconnect(&mut self) -> Result<Option<DeviceDescriptor>, SessionError> {
        let previous = match core::mem::take(&mut self.state) {
            ConnectionState::Disconnected => {
                debug!("Session: disconnect while idle, nothing to do");
                return Ok(None);
            }
            ConnectionState::Connecting(d) => {
                info!("Session: cancelling pending connect to {}", d);
                None
            }
            ConnectionState::Connected(d) => Some(d),
        };

        self.link.close();
        self.decoder.reset();

        if let Err(e) = self.transport.disconnect().await {
            let e = SessionError::transport(TransportOp::Disconnect, e);
            warn!("Session: {}", e);
            return Err(e);
        }
        if let Some(d) = &previous {
            info!("Session: disconnected from {}", d);
        }
        Ok(previous)
    }

    /// Switch telegram shape.  Partially buffered bytes are discarded.
    pub fn set_schema(&mut self, schema: TelegramSchema) {
        if schema != self.decoder.schema() {
            info!("Session: schema {:?} -> {:?}", self.decoder.schema(), schema);
        }
        self.decoder.set_schema(schema);
    }

    // ── Inbound stream ────────────────────────────────────────

    /// Decode everything queued so far.  Returns the telegram count.
    pub fn drain(&mut self, sink: &mut impl TelegramSink) -> usize {
        let mut delivered = 0;
        while let Some(msg) = self.link.try_receive() {
            delivered += self.process(msg, sink);
        }
        delivered
    }

    /// Wait for the next inbound chunk, then drain.  Returns the telegram
    /// count (possibly zero for a partial line).
    pub async fn next(&mut self, sink: &mut impl TelegramSink) -> usize {
        let msg = self.link.receive().await;
        let delivered = self.process(msg, sink);
        delivered + self.drain(sink)
    }

    fn process(&mut self, msg: ChunkMsg, sink: &mut impl TelegramSink) -> usize {
        if msg.generation != self.generation || !self.state.is_connected() {
            debug!(
                "Session: dropping {} bytes from generation {}",
                msg.data.len(),
                msg.generation
            );
            return 0;
        }
        if msg.resync {
            warn!("Session: inbound bytes were lost, resynchronising");
            self.decoder.resync();
        }

        let mut delivered = 0;
        for telegram in self.decoder.feed(&msg.data) {
            sink.on_telegram(telegram);
            delivered += 1;
        }
        delivered
    }
}
