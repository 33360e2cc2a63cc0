//! Transport connector: one fresh connection per call.
//!
//! TCP endpoints use [`tokio::net::TcpStream`]. Unix domain socket
//! endpoints go through the `interprocess` local-socket API with a
//! filesystem path name. Both are erased behind [`RpcStream`] so the
//! framing and deadline logic never depends on the transport.

use futures_util::StreamExt;
use interprocess::local_socket::tokio::Stream as LocalSocketStream;
use interprocess::local_socket::traits::tokio::Stream as _;
use interprocess::local_socket::{GenericFilePath, ToFsName};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;
use tracing::debug;

use crate::config::Endpoint;
use crate::rpc::codec::ResponseCodec;
use crate::{AppError, Result};

/// Byte stream a call runs over.
pub trait RpcStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> RpcStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// A single open connection to the game server.
///
/// Closing is idempotent. A connection dropped without [`Connection::close`]
/// (for example when a call's deadline expires mid-read) still releases its
/// socket when the underlying stream is dropped.
pub struct Connection {
    stream: Box<dyn RpcStream>,
    peer: String,
    closed: bool,
}

impl Connection {
    /// Open a connection to `endpoint`. Never retries.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the connection is refused, the socket
    /// path does not exist, or access is denied.
    pub async fn open(endpoint: &Endpoint) -> Result<Self> {
        let stream: Box<dyn RpcStream> = match endpoint {
            Endpoint::Tcp { host, port } => {
                let stream = TcpStream::connect((host.as_str(), *port))
                    .await
                    .map_err(|err| connect_error(endpoint, &err))?;
                stream.set_nodelay(true)?;
                Box::new(stream)
            }
            Endpoint::Unix { path } => {
                let name = path
                    .as_path()
                    .to_fs_name::<GenericFilePath>()
                    .map_err(|err| connect_error(endpoint, &err))?;
                let stream = LocalSocketStream::connect(name)
                    .await
                    .map_err(|err| connect_error(endpoint, &err))?;
                Box::new(stream)
            }
        };

        debug!(%endpoint, "connection opened");
        Ok(Self::from_stream(stream, endpoint.to_string()))
    }

    /// Wrap an already-connected stream.
    #[must_use]
    pub fn from_stream(stream: Box<dyn RpcStream>, peer: impl Into<String>) -> Self {
        Self {
            stream,
            peer: peer.into(),
            closed: false,
        }
    }

    /// Display form of the remote endpoint.
    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Whether [`Connection::close`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Write one encoded request frame and flush it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the connection is closed or the write
    /// fails.
    pub async fn send(&mut self, frame: &[u8]) -> Result<()> {
        if self.closed {
            return Err(AppError::Transport("connection already closed".into()));
        }
        self.stream
            .write_all(frame)
            .await
            .map_err(|err| AppError::Transport(format!("failed to send request: {err}")))?;
        self.stream
            .flush()
            .await
            .map_err(|err| AppError::Transport(format!("failed to send request: {err}")))?;
        Ok(())
    }

    /// Read chunks until one complete response frame is buffered.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` on read failure and `AppError::Protocol`
    /// if the peer closes before a complete frame arrives.
    pub async fn receive(&mut self) -> Result<String> {
        if self.closed {
            return Err(AppError::Transport("connection already closed".into()));
        }
        let mut frames = FramedRead::new(&mut self.stream, ResponseCodec::new());
        match frames.next().await {
            Some(frame) => frame,
            None => Err(AppError::Protocol(
                "connection closed without a response".into(),
            )),
        }
    }

    /// Shut the connection down. Returns `false` if it was already closed.
    pub async fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        if let Err(err) = self.stream.shutdown().await {
            // The peer may already be gone; the descriptor is released on drop.
            debug!(peer = %self.peer, %err, "shutdown after response failed");
        }
        debug!(peer = %self.peer, "connection closed");
        true
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.closed {
            debug!(peer = %self.peer, "connection dropped before orderly close");
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.peer)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

fn connect_error(endpoint: &Endpoint, err: &std::io::Error) -> AppError {
    AppError::Transport(format!("failed to connect to {endpoint}: {err}"))
}
