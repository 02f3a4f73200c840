//! Application core: the monitor service and its ports.
//!
//! Wires the link session, device registry, oxygen control loop and
//! prediction form into one service.  All interaction with the platform
//! happens through **port traits** defined in [`ports`] (plus the
//! [`SerialTransport`](crate::link::transport::SerialTransport)), keeping
//! this layer testable with mock adapters.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
