#![forbid(unsafe_code)]

//! Minimal RPC client for a long-lived game server.
//!
//! A call sends `{"action": ..., "params": ...}\n` over a fresh TCP or Unix
//! domain socket connection and waits, under a deadline, for a single
//! `{"success": ..., "data"|"error": ...}\n` response.

pub mod client;
pub mod config;
pub mod errors;
pub mod rpc;

pub use client::GameClient;
pub use config::{ClientConfig, Endpoint};
pub use errors::{AppError, ErrorKind, Result};
