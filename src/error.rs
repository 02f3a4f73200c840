//! Unified error types for the telemetry core.
//!
//! Every subsystem has its own small enum; all of them convert into the
//! top-level [`Error`] so the service layer can surface a single type to the
//! UI collaborator.  None of these are fatal: the worst case is a stalled
//! stream waiting for a fresh `connect`.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the core funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Connection lifecycle or transport failure.
    Session(SessionError),
    /// A frame could not be decoded into a telegram.
    Frame(FrameError),
    /// A reading was rejected by the control loop.
    Control(ControlError),
    /// Device registry misuse.
    Registry(RegistryError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Prediction form incomplete or verdict not understood.
    Prediction(PredictionError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session(e) => write!(f, "session: {e}"),
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Control(e) => write!(f, "control: {e}"),
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Prediction(e) => write!(f, "prediction: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

/// The transport operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOp {
    Enable,
    List,
    Connect,
    Disconnect,
}

impl fmt::Display for TransportOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enable => write!(f, "enable"),
            Self::List => write!(f, "list"),
            Self::Connect => write!(f, "connect"),
            Self::Disconnect => write!(f, "disconnect"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The transport refused, failed or timed out.  The session is
    /// `Disconnected` whenever this is returned.
    Transport { op: TransportOp, reason: String },
    /// `connect` while a session to the named device is already up.
    AlreadyConnected(String),
    /// `connect` while an attempt to the named device is still pending.
    AlreadyConnecting(String),
    /// The operation needs a live connection.
    NotConnected,
}

impl SessionError {
    pub(crate) fn transport(op: TransportOp, reason: impl fmt::Display) -> Self {
        Self::Transport {
            op,
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { op, reason } => write!(f, "transport {op} failed: {reason}"),
            Self::AlreadyConnected(id) => write!(f, "already connected to {id}"),
            Self::AlreadyConnecting(id) => write!(f, "already connecting to {id}"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<SessionError> for Error {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

// ---------------------------------------------------------------------------
// Frame errors (malformed telegrams)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Frame exceeded the configured byte limit before a delimiter arrived.
    Oversized { limit: usize },
    /// Frame bytes are not valid UTF-8.
    NotUtf8,
    /// Frame held nothing but whitespace.
    Empty,
    /// Field count does not match the schema.
    Arity { expected: usize, found: usize },
    /// Field at `index` is not a finite number.
    BadField { index: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oversized { limit } => write!(f, "no delimiter within {limit} bytes"),
            Self::NotUtf8 => write!(f, "not UTF-8"),
            Self::Empty => write!(f, "empty frame"),
            Self::Arity { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            Self::BadField { index } => write!(f, "field {index} is not a finite number"),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Control errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// A non-numeric or non-finite value reached the control loop.
    /// Carries the offending input for diagnostics.
    InvalidReading(String),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidReading(raw) => write!(f, "invalid oxygen reading {raw:?}"),
        }
    }
}

impl std::error::Error for ControlError {}

impl From<ControlError> for Error {
    fn from(e: ControlError) -> Self {
        Self::Control(e)
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No device with this id in the current discovery snapshot.
    NotFound(String),
    /// A connect was requested with no device selected.
    NoSelection,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "device {id} not found"),
            Self::NoSelection => write!(f, "no device selected"),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be parsed.  Carries the parser message.
    Malformed(String),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed config: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Prediction errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionError {
    /// A classifier feature has no value yet.
    Missing(&'static str),
    /// Manual entry for a feature is not a finite number.
    InvalidValue(&'static str),
    /// The classifier answered with something other than 0 or 1.
    UnknownVerdict(i64),
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "missing value for {name}"),
            Self::InvalidValue(name) => write!(f, "{name} is not a number"),
            Self::UnknownVerdict(v) => write!(f, "unknown verdict {v}"),
        }
    }
}

impl std::error::Error for PredictionError {}

impl From<PredictionError> for Error {
    fn from(e: PredictionError) -> Self {
        Self::Prediction(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
