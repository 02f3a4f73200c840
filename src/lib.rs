//! Aquamon water-quality telemetry core.
//!
//! Reads sensor telegrams over an intermittent serial-over-radio link,
//! regulates dissolved oxygen with a two-threshold pump loop and a latching
//! alarm, and prepares classifier requests.  The host application supplies
//! the transport, the actuators and the UI through the port traits in
//! [`app::ports`] and [`link::transport`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod link;
pub mod prediction;

pub use app::service::MonitorService;
pub use config::MonitorConfig;
pub use error::{Error, Result};
