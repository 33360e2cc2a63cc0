//! Line-delimited JSON RPC plumbing.
//!
//! One call is one connection carrying one request frame and one response
//! frame, each a JSON object terminated by `\n`.
//!
//! Submodules:
//! - `request`: request envelope and wire encoding.
//! - `transport`: TCP / Unix domain socket connector.
//! - `codec`: [`Decoder`](tokio_util::codec::Decoder) that frames the response.
//! - `response`: response envelope decoding into success or failure.
//! - `deadline`: per-call state machine and timeout race.

pub mod codec;
pub mod deadline;
pub mod request;
pub mod response;
pub mod transport;
