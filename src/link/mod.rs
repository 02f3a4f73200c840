//! Serial link to a sensor station.
//!
//! ```text
//! SerialTransport ─▶ InboundSink ─▶ channel ─▶ TelemetrySession
//!                                                 │  LineDecoder
//!                                                 │  TelegramSchema
//!                                                 ▼
//!                                            TelegramSink
//! ```
//!
//! - [`transport`]: the platform binding trait
//! - [`channels`]: inbound chunk queue with generation tagging
//! - [`codec`]: newline framing and telegram decoding
//! - [`telegram`]: field schemas and validation
//! - [`session`]: connection lifecycle
//! - [`registry`]: discovered devices and the selection

pub mod channels;
pub mod codec;
pub mod registry;
pub mod session;
pub mod telegram;
pub mod transport;

pub use channels::InboundSink;
pub use registry::{DeviceDescriptor, DeviceRegistry};
pub use session::{ConnectionState, TelegramSink, TelemetrySession};
pub use telegram::{SensorChannel, Telegram, TelegramSchema};
pub use transport::SerialTransport;
