//! Client facade: `call(action, params) -> data`.
//!
//! Each call is independent: it encodes its own request, opens its own
//! connection, buffers its own response and arms its own deadline. The
//! client itself only holds the immutable [`ClientConfig`], so it can be
//! cloned or shared across tasks freely.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{ClientConfig, Endpoint};
use crate::errors::ErrorKind;
use crate::rpc::deadline::{CallLifecycle, DeadlineGuard, OutcomeKind};
use crate::rpc::request::Request;
use crate::rpc::response::decode_response;
use crate::rpc::transport::Connection;
use crate::Result;

/// RPC client bound to one game server endpoint.
#[derive(Debug, Clone)]
pub struct GameClient {
    config: ClientConfig,
}

impl GameClient {
    /// Build a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        debug!(endpoint = %config.endpoint, timeout_ms = config.timeout_ms, "game client configured");
        Ok(Self { config })
    }

    /// Build a client from `GAME_RPC_ADDR` / `GAME_RPC_SOCKET`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no single endpoint variable is set.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.config.endpoint
    }

    /// Endpoint formatted as `host:port` or the socket path.
    #[must_use]
    pub fn address(&self) -> String {
        self.config.endpoint.to_string()
    }

    /// Per-call deadline.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// Invoke `action` with optional parameters and return the `data` value.
    ///
    /// A response without `data` yields `Value::Null`.
    ///
    /// # Errors
    ///
    /// - `AppError::Application` with the server message for `success: false`.
    /// - `AppError::Timeout` if no response arrives within the deadline.
    /// - `AppError::Transport` for connect, write or read failures.
    /// - `AppError::Protocol` for an empty action or a malformed response.
    pub async fn call(&self, action: &str, params: Option<Map<String, Value>>) -> Result<Value> {
        let request = Request::new(action, params)?;
        self.execute(&request).await
    }

    /// Like [`GameClient::call`], with parameters taken from any value that
    /// serializes to a JSON object.
    ///
    /// # Errors
    ///
    /// As [`GameClient::call`]; additionally `AppError::Protocol` if `params`
    /// does not serialize to an object. No connection is attempted then.
    pub async fn call_with<P>(&self, action: &str, params: &P) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let request = Request::with_params(action, params)?;
        self.execute(&request).await
    }

    async fn execute(&self, request: &Request<'_>) -> Result<Value> {
        let frame = request.encode()?;
        let span = info_span!(
            "rpc_call",
            call_id = %Uuid::new_v4(),
            action = request.action,
            endpoint = %self.config.endpoint
        );

        async move {
            let mut lifecycle = CallLifecycle::new();
            let guard = DeadlineGuard::new(self.config.timeout());
            let result = guard
                .run(run_pipeline(&self.config.endpoint, &frame, &mut lifecycle))
                .await;
            lifecycle.settle(OutcomeKind::of(&result));

            match &result {
                Ok(_) => debug!("call succeeded"),
                Err(err) if err.kind() == ErrorKind::Application => {
                    debug!(error = %err, "server reported failure");
                }
                Err(err) => warn!(error = %err, "call failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Connect, exchange one frame each way, and close.
///
/// The connection is closed on every path that returns; if the deadline
/// drops this future instead, dropping the connection releases it.
async fn run_pipeline(
    endpoint: &Endpoint,
    frame: &[u8],
    lifecycle: &mut CallLifecycle,
) -> Result<Value> {
    let mut conn = Connection::open(endpoint).await?;
    let result = exchange(&mut conn, frame, lifecycle).await;
    conn.close().await;
    result
}

async fn exchange(
    conn: &mut Connection,
    frame: &[u8],
    lifecycle: &mut CallLifecycle,
) -> Result<Value> {
    conn.send(frame).await?;
    lifecycle.awaiting_response();
    let response = conn.receive().await?;
    decode_response(&response)?.into_result()
}
