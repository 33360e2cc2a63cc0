//! Error types shared across the client.

use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Shared client result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Client error enumeration covering every way a call can fail.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid endpoint or option; raised before any I/O.
    Config(String),
    /// Connect, write, or read failure at the socket layer.
    Transport(String),
    /// Malformed or structurally invalid frame, or an unencodable request.
    Protocol(String),
    /// Well-formed response with `success: false`; carries the server message.
    Application(String),
    /// No terminal outcome within the configured duration.
    Timeout(Duration),
}

/// Payload-free discriminant of [`AppError`] for branching in calling code.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// See [`AppError::Config`].
    Config,
    /// See [`AppError::Transport`].
    Transport,
    /// See [`AppError::Protocol`].
    Protocol,
    /// See [`AppError::Application`].
    Application,
    /// See [`AppError::Timeout`].
    Timeout,
}

impl AppError {
    /// Kind of this error, independent of its message.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Application(_) => ErrorKind::Application,
            Self::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol: {msg}"),
            // Server-supplied text is surfaced verbatim.
            Self::Application(msg) => f.write_str(msg),
            Self::Timeout(limit) => write!(
                f,
                "timeout: no response within {} ms",
                limit.as_millis()
            ),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}
