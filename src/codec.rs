//! Native messaging framing.
//!
//! Wire format, repeated for as long as the stream stays open:
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────┐
//! │ Length (4B, u32)     │ Payload                      │
//! │ host byte order      │ (Length bytes of UTF-8 JSON) │
//! └──────────────────────┴──────────────────────────────┘
//! ```
//!
//! The browser writes the length prefix in the platform's native byte order, so
//! [`ByteOrder::Native`] is the default everywhere. The explicit orders exist so the
//! codec can be exercised for both layouts on any machine.
//!
//! Neither [`Decoder`] nor [`Encoder`] enforces a message size limit; that belongs to
//! the protocol layer (see [`crate::host`]).

use bytes::{Buf, BytesMut};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::FrameError;

/// Size of the length prefix in front of every payload.
pub const LENGTH_PREFIX_SIZE: usize = 4;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Byte order of the length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Whatever the target platform uses. This is what browsers speak.
    #[default]
    Native,
    Little,
    Big,
}

impl ByteOrder {
    /// Replace [`ByteOrder::Native`] with the concrete order of the compilation target.
    pub const fn resolve(self) -> ByteOrder {
        match self {
            ByteOrder::Native => {
                if cfg!(target_endian = "big") {
                    ByteOrder::Big
                } else {
                    ByteOrder::Little
                }
            }
            other => other,
        }
    }

    pub fn read_u32(self, bytes: [u8; LENGTH_PREFIX_SIZE]) -> u32 {
        match self.resolve() {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            _ => u32::from_le_bytes(bytes),
        }
    }

    pub fn write_u32(self, n: u32) -> [u8; LENGTH_PREFIX_SIZE] {
        match self.resolve() {
            ByteOrder::Big => n.to_be_bytes(),
            _ => n.to_le_bytes(),
        }
    }
}

/// Where a [`Decoder`] is within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Fewer than four prefix bytes have arrived.
    AwaitingLength,
    /// The prefix has been consumed; waiting for `expected_len` payload bytes.
    AwaitingPayload { expected_len: usize },
}

/// Incremental frame decoder for one input stream.
///
/// Feed it chunks exactly as they come off the pipe, however they were split. Bytes that
/// do not yet complete a frame stay buffered until the next call.
///
/// ```rust
/// use native_editor_host::codec::{Decoder, Encoder};
/// use serde_json::json;
///
/// let frame = Encoder::default().encode(&json!({"a": 1})).unwrap();
/// let mut decoder = Decoder::new();
///
/// assert!(decoder.decode(&frame[..2]).is_empty());
/// let out: Vec<_> = decoder.decode(&frame[2..]).into_iter().map(Result::unwrap).collect();
/// assert_eq!(out, vec![json!({"a": 1})]);
/// ```
#[derive(Debug)]
pub struct Decoder {
    buf: BytesMut,
    state: DecoderState,
    order: ByteOrder,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Create a decoder reading native-endian length prefixes.
    pub fn new() -> Self {
        Self::with_byte_order(ByteOrder::Native)
    }

    pub fn with_byte_order(order: ByteOrder) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            state: DecoderState::AwaitingLength,
            order: order.resolve(),
        }
    }

    /// Append `chunk` to the stream and return every frame it completes, in order.
    ///
    /// Incomplete input yields an empty vector. A frame whose payload is not UTF-8 JSON
    /// yields an `Err` entry in its position; entries before it are kept and frames after
    /// it are still decoded.
    pub fn decode(&mut self, chunk: impl AsRef<[u8]>) -> Vec<Result<Value, FrameError>> {
        self.push(chunk);
        std::iter::from_fn(|| self.next_message()).collect()
    }

    /// Append `chunk` without decoding anything yet.
    pub fn push(&mut self, chunk: impl AsRef<[u8]>) {
        let chunk = chunk.as_ref();
        if !chunk.is_empty() {
            self.buf.extend_from_slice(chunk);
        }
    }

    /// Decode the next buffered frame, or `None` if it has not fully arrived.
    pub fn next_message(&mut self) -> Option<Result<Value, FrameError>> {
        loop {
            match self.state {
                DecoderState::AwaitingLength => {
                    if self.buf.len() < LENGTH_PREFIX_SIZE {
                        return None;
                    }
                    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
                    self.buf.copy_to_slice(&mut prefix);
                    let expected_len = self.order.read_u32(prefix) as usize;
                    self.state = DecoderState::AwaitingPayload { expected_len };
                }
                DecoderState::AwaitingPayload { expected_len } => {
                    if self.buf.len() < expected_len {
                        return None;
                    }
                    let payload = self.buf.split_to(expected_len);
                    self.state = DecoderState::AwaitingLength;

                    let message = parse_payload(&payload);
                    match &message {
                        Ok(_) => trace!(len = expected_len, "decoded frame"),
                        Err(err) => debug!(len = expected_len, error = %err, "malformed frame"),
                    }
                    return Some(message);
                }
            }
        }
    }

    /// Declared payload length of the next frame, as soon as its prefix has arrived.
    ///
    /// Lets a protocol layer reject a frame by size before it is decoded.
    pub fn pending_len(&self) -> Option<usize> {
        match self.state {
            DecoderState::AwaitingPayload { expected_len } => Some(expected_len),
            DecoderState::AwaitingLength if self.buf.len() >= LENGTH_PREFIX_SIZE => {
                let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
                prefix.copy_from_slice(&self.buf[..LENGTH_PREFIX_SIZE]);
                Some(self.order.read_u32(prefix) as usize)
            }
            DecoderState::AwaitingLength => None,
        }
    }

    /// Bytes held back because they do not complete a prefix or payload yet.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }
}

fn parse_payload(payload: &[u8]) -> Result<Value, FrameError> {
    let text = std::str::from_utf8(payload)?;
    serde_json::from_str(text).map_err(FrameError::InvalidJson)
}

/// Stateless frame encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoder {
    order: ByteOrder,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(ByteOrder::Native)
    }
}

impl Encoder {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            order: order.resolve(),
        }
    }

    /// Serialize `value` and prepend its byte length.
    ///
    /// Nothing is returned on failure; there is no partial frame.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, FrameError> {
        let json = serde_json::to_vec(value).map_err(FrameError::Unencodable)?;
        let len = u32::try_from(json.len()).map_err(|_| FrameError::PayloadTooLarge {
            size: json.len(),
            max: u32::MAX as usize,
        })?;

        let mut out = Vec::with_capacity(LENGTH_PREFIX_SIZE + json.len());
        out.extend_from_slice(&self.order.write_u32(len));
        out.extend_from_slice(&json);
        Ok(out)
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }
}

/// Encode any serde-serializable value into a native-endian frame:
/// 4-byte length + JSON bytes.
pub fn encode_message<T: Serialize + ?Sized>(msg: &T) -> Result<Vec<u8>, FrameError> {
    Encoder::default().encode(msg)
}
