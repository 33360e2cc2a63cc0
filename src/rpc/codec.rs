//! Response framing for the line-delimited JSON protocol.
//!
//! The server answers with one JSON object terminated by `\n`. Bytes may
//! arrive in any number of chunks, so [`ResponseCodec`] scans the cumulative
//! read buffer rather than a single chunk, and only yields once a delimiter
//! has been seen. Both transports share this codec; neither assumes the
//! response fits in one read.
//!
//! # Usage
//!
//! Use [`ResponseCodec`] as the codec parameter for
//! [`tokio_util::codec::FramedRead`]:
//!
//! ```rust,ignore
//! use tokio_util::codec::FramedRead;
//! use game_rpc::rpc::codec::ResponseCodec;
//!
//! let frames = FramedRead::new(&mut stream, ResponseCodec::new());
//! ```

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::{AppError, Result};

/// Largest response frame accepted: 8 MiB.
///
/// A peer that streams more than this without a `\n` causes
/// [`ResponseCodec::decode`] to fail with `AppError::Protocol`
/// instead of buffering without bound.
pub const MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

/// UTF-8 byte-order mark, stripped from the start of a frame.
const BOM: char = '\u{feff}';

/// Single-frame decoder for server responses.
///
/// # Decoder
///
/// - `Ok(None)` while no `\n` has been buffered yet.
/// - `Ok(Some(frame))` once a delimiter arrives. The frame is everything
///   before the first `\n`, with one leading BOM removed and surrounding
///   whitespace trimmed. Anything buffered after the delimiter is dropped;
///   one frame is expected per connection.
/// - `Err(AppError::Protocol)` for over-long or non-UTF-8 frames, and at
///   end-of-stream when no delimiter was ever seen.
#[derive(Debug)]
pub struct ResponseCodec {
    /// Offset already scanned for `\n`; avoids rescanning earlier chunks.
    next_index: usize,
    max_length: usize,
}

impl ResponseCodec {
    /// Codec with the default [`MAX_FRAME_BYTES`] limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_length(MAX_FRAME_BYTES)
    }

    /// Codec with a custom frame length limit.
    #[must_use]
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            next_index: 0,
            max_length,
        }
    }
}

impl Default for ResponseCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ResponseCodec {
    type Item = String;
    type Error = AppError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let scan_from = self.next_index.min(src.len());
        let Some(offset) = src[scan_from..].iter().position(|b| *b == b'\n') else {
            if src.len() > self.max_length {
                return Err(too_long(self.max_length));
            }
            self.next_index = src.len();
            return Ok(None);
        };

        let end = scan_from + offset;
        self.next_index = 0;
        if end > self.max_length {
            return Err(too_long(self.max_length));
        }

        let raw = src.split_to(end);
        // Delimiter and any trailing bytes are not part of the protocol.
        src.clear();
        normalize_frame(&raw).map(Some)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() {
            Err(AppError::Protocol(
                "connection closed without a response".into(),
            ))
        } else {
            Err(AppError::Protocol(format!(
                "incomplete response: stream ended after {} bytes without a line feed",
                src.len()
            )))
        }
    }
}

/// Strip one leading BOM, then surrounding whitespace.
///
/// # Errors
///
/// Returns `AppError::Protocol` if `raw` is not valid UTF-8.
pub fn normalize_frame(raw: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(raw)
        .map_err(|err| AppError::Protocol(format!("response is not valid utf-8: {err}")))?;
    let text = text.strip_prefix(BOM).unwrap_or(text);
    Ok(text.trim().to_owned())
}

fn too_long(limit: usize) -> AppError {
    AppError::Protocol(format!("response too long: exceeded {limit} bytes"))
}
