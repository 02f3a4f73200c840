//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements       | Connects to              |
//! |------------|------------------|--------------------------|
//! | `log_sink` | EventSink        | `log` facade             |
//! |            | ActuatorPort     | `log` facade (no relay)  |
//! | `loopback` | SerialTransport  | In-process byte feeder   |

pub mod log_sink;
pub mod loopback;
