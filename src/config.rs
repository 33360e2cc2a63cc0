//! Endpoint resolution and client configuration.
//!
//! The endpoint is resolved once, from an explicit value or from the
//! environment, and is immutable for the lifetime of a
//! [`GameClient`](crate::client::GameClient).
//!
//! ## Environment
//!
//! | Variable          | Meaning                                   |
//! |-------------------|-------------------------------------------|
//! | `GAME_RPC_ADDR`   | TCP endpoint as `host:port`               |
//! | `GAME_RPC_SOCKET` | Filesystem path of a Unix domain socket   |
//!
//! ## Config file
//!
//! ```toml
//! timeout_ms = 5000
//! address = "127.0.0.1:7777"     # or: socket_path = "/run/game/rpc.sock"
//! ```

use std::env;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// Environment variable holding a `host:port` TCP endpoint.
pub const ADDRESS_ENV: &str = "GAME_RPC_ADDR";

/// Environment variable holding a Unix domain socket path.
pub const SOCKET_ENV: &str = "GAME_RPC_SOCKET";

/// Call deadline applied when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Transport-specific address of the game server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// TCP stream to `host:port`.
    Tcp {
        /// Host name or IP literal (IPv6 literals are stored unbracketed).
        host: String,
        /// Non-zero TCP port.
        port: u16,
    },
    /// Byte stream over a Unix domain socket.
    Unix {
        /// Filesystem path of the socket.
        path: PathBuf,
    },
}

impl Endpoint {
    /// TCP endpoint from its parts.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Unix domain socket endpoint.
    #[must_use]
    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Parse a `host:port` string. IPv6 hosts must be bracketed (`[::1]:7777`).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the host is empty, the port is missing,
    /// zero, or out of range.
    pub fn parse_tcp(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (host, port) = raw
            .rsplit_once(':')
            .ok_or_else(|| AppError::Config(format!("expected host:port, got '{raw}'")))?;

        let host = match host.strip_prefix('[') {
            Some(inner) => inner
                .strip_suffix(']')
                .ok_or_else(|| AppError::Config(format!("unterminated IPv6 host in '{raw}'")))?,
            None if host.contains(':') => {
                return Err(AppError::Config(format!(
                    "IPv6 hosts must be bracketed, got '{raw}'"
                )))
            }
            None => host,
        };

        let port: u16 = port
            .parse()
            .map_err(|err| AppError::Config(format!("invalid port in '{raw}': {err}")))?;

        let endpoint = Self::tcp(host, port);
        endpoint.validate()?;
        Ok(endpoint)
    }

    /// TCP endpoint from `explicit`, falling back to `GAME_RPC_ADDR`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither source provides a value or the
    /// value does not parse.
    pub fn resolve_tcp(explicit: Option<&str>) -> Result<Self> {
        match explicit.map(str::to_owned).or_else(|| read_env(ADDRESS_ENV)) {
            Some(raw) => Self::parse_tcp(&raw),
            None => Err(AppError::Config(format!(
                "no TCP endpoint given and {ADDRESS_ENV} is not set"
            ))),
        }
    }

    /// Unix socket endpoint from `explicit`, falling back to `GAME_RPC_SOCKET`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither source provides a non-empty path.
    pub fn resolve_unix(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| read_env(SOCKET_ENV).map(PathBuf::from))
            .ok_or_else(|| {
                AppError::Config(format!("no socket path given and {SOCKET_ENV} is not set"))
            })?;
        let endpoint = Self::unix(path);
        endpoint.validate()?;
        Ok(endpoint)
    }

    /// Endpoint from whichever of `GAME_RPC_ADDR` / `GAME_RPC_SOCKET` is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither or both variables are set.
    pub fn from_env() -> Result<Self> {
        match (read_env(ADDRESS_ENV), read_env(SOCKET_ENV)) {
            (Some(_), Some(_)) => Err(AppError::Config(format!(
                "both {ADDRESS_ENV} and {SOCKET_ENV} are set; choose one transport"
            ))),
            (Some(addr), None) => Self::parse_tcp(&addr),
            (None, Some(path)) => Self::resolve_unix(Some(Path::new(&path))),
            (None, None) => Err(AppError::Config(format!(
                "no endpoint configured: set {ADDRESS_ENV} or {SOCKET_ENV}"
            ))),
        }
    }

    /// Check the structural invariants of the endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an empty host, port `0`, or an empty path.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Tcp { host, .. } if host.trim().is_empty() => {
                Err(AppError::Config("endpoint host must not be empty".into()))
            }
            Self::Tcp { port: 0, .. } => {
                Err(AppError::Config("endpoint port must be non-zero".into()))
            }
            Self::Unix { path } if path.as_os_str().is_empty() => {
                Err(AppError::Config("socket path must not be empty".into()))
            }
            _ => Ok(()),
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp { host, port } if host.contains(':') => write!(f, "[{host}]:{port}"),
            Self::Tcp { host, port } => write!(f, "{host}:{port}"),
            Self::Unix { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Validated client configuration: one endpoint plus the call deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Where calls connect to.
    pub endpoint: Endpoint,
    /// Per-call deadline in milliseconds; applies to every call of a client.
    pub timeout_ms: u64,
}

/// On-disk shape of the config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
struct RawConfig {
    address: Option<String>,
    socket_path: Option<PathBuf>,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
}

impl ClientConfig {
    /// Configuration with the default 5000 ms deadline.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Override the per-call deadline.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Deadline as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Configuration from the environment with the default deadline.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no single endpoint variable is set.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Endpoint::from_env()?))
    }

    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// Exactly one of `address` or `socket_path` must be present.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(raw)?;
        let endpoint = match (raw.address, raw.socket_path) {
            (Some(addr), None) => Endpoint::parse_tcp(&addr)?,
            (None, Some(path)) => Endpoint::unix(path),
            (Some(_), Some(_)) => {
                return Err(AppError::Config(
                    "set either `address` or `socket_path`, not both".into(),
                ))
            }
            (None, None) => {
                return Err(AppError::Config(
                    "missing endpoint: set `address` or `socket_path`".into(),
                ))
            }
        };

        let config = Self::new(endpoint).with_timeout_ms(raw.timeout_ms);
        config.validate()?;
        Ok(config)
    }

    /// Validate endpoint and deadline.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the endpoint is invalid or the deadline
    /// is zero.
    pub fn validate(&self) -> Result<()> {
        self.endpoint.validate()?;
        if self.timeout_ms == 0 {
            return Err(AppError::Config("timeout_ms must be greater than 0".into()));
        }
        Ok(())
    }
}

/// Read an environment variable, treating empty values as unset.
fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
