//! Per-call lifecycle and deadline enforcement.
//!
//! Every call walks `Connecting → AwaitingResponse → Settled(kind)`.
//! [`CallLifecycle`] records where a call got to and how it ended, for
//! logging; it does not decide the outcome.
//!
//! [`DeadlineGuard::run`] owns the race between pipeline completion and
//! deadline expiry. When the deadline fires the pipeline future is dropped,
//! and with it the connection it owns, so the socket is released even
//! though no frame ever arrived. When the pipeline finishes first the timer
//! is dropped with the `select!`, so it can never fire afterwards.

use std::future::Future;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::ErrorKind;
use crate::{AppError, Result};

/// Terminal classification of a call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OutcomeKind {
    /// `success: true` response decoded.
    Success,
    /// `success: false` response decoded.
    Failure,
    /// Frame malformed, incomplete, or request unencodable.
    ProtocolError,
    /// Socket-level connect, write, or read failure.
    TransportError,
    /// Deadline expired first.
    Timeout,
}

impl OutcomeKind {
    /// Classify a finished call result.
    #[must_use]
    pub fn of(result: &Result<Value>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(err) => match err.kind() {
                ErrorKind::Application => Self::Failure,
                ErrorKind::Timeout => Self::Timeout,
                ErrorKind::Transport => Self::TransportError,
                // `Config` is rejected before a call starts and never comes
                // back from one; if it did it would be a bad request.
                ErrorKind::Protocol | ErrorKind::Config => Self::ProtocolError,
            },
        }
    }
}

/// Where a call currently is.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CallState {
    /// Opening the socket.
    Connecting,
    /// Request written; buffering the response.
    AwaitingResponse,
    /// Terminal; no further transitions.
    Settled(OutcomeKind),
}

/// State machine for one call.
#[derive(Debug)]
pub struct CallLifecycle {
    state: CallState,
    started: Instant,
}

impl CallLifecycle {
    /// New call in [`CallState::Connecting`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: CallState::Connecting,
            started: Instant::now(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CallState {
        self.state
    }

    /// Time since the call started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether the call has reached a terminal state.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self.state, CallState::Settled(_))
    }

    /// Mark the request as sent. Ignored once settled.
    pub fn awaiting_response(&mut self) -> bool {
        if self.state != CallState::Connecting {
            return false;
        }
        self.state = CallState::AwaitingResponse;
        debug!(elapsed_ms = self.elapsed_ms(), "request sent, awaiting response");
        true
    }

    /// Record the terminal outcome. A call settles once; later attempts are
    /// ignored and return `false`.
    pub fn settle(&mut self, kind: OutcomeKind) -> bool {
        if let CallState::Settled(existing) = self.state {
            debug!(?existing, ignored = ?kind, "call already settled");
            return false;
        }
        self.state = CallState::Settled(kind);
        debug!(outcome = ?kind, elapsed_ms = self.elapsed_ms(), "call settled");
        true
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for CallLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounds a call pipeline by a fixed duration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DeadlineGuard {
    limit: Duration,
}

impl DeadlineGuard {
    /// Guard with the given limit.
    #[must_use]
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    /// Configured limit.
    #[must_use]
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Run `pipeline` to completion or until the deadline, whichever is first.
    ///
    /// On expiry `pipeline` is dropped before this returns, releasing
    /// everything it owns.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Timeout` on expiry, otherwise whatever `pipeline`
    /// returned.
    pub async fn run<T, F>(&self, pipeline: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            result = pipeline => result,
            () = tokio::time::sleep(self.limit) => {
                warn!(timeout_ms = %self.limit.as_millis(), "call deadline expired");
                Err(AppError::Timeout(self.limit))
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
