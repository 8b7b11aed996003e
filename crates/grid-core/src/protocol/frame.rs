//! TLV framing codec for the Grid-Over-TCP wire format.
//!
//! Wire format:
//! ```text
//! [tag:1][length:2][value:N]
//! ```
//! `length` is a big-endian u16 counting the value bytes only, so a single
//! frame carries at most 65535 bytes. A frame with `length == 0` is valid and
//! has an empty value.
//!
//! Scalar payloads (worker count, matrix size, elapsed milliseconds) are
//! 4-byte big-endian unsigned integers encoded with [`encode_u32`].

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::messages::{MessageTag, FRAME_HEADER_SIZE, MAX_PAYLOAD};
use thiserror::Error;

/// Errors that can occur while encoding, decoding, or transporting a frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The value does not fit the 16-bit length field.
    #[error("payload too large: {0} bytes exceed the 16-bit length field")]
    PayloadTooLarge(usize),

    /// The tag byte in the header is not a recognized value.
    #[error("unknown message tag: 0x{0:02X}")]
    UnknownTag(u8),

    /// The stream closed in the middle of a frame header or value.
    #[error("stream closed mid-frame while {expected} byte(s) were still due")]
    Truncated { expected: usize },

    /// The stream closed cleanly at a frame boundary.
    #[error("end of stream")]
    EndOfStream,

    /// An I/O error occurred on the underlying stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One decoded TLV unit.
///
/// Invariant: `value.len() <= MAX_PAYLOAD`, enforced at construction and by
/// the decoder (the length field cannot express anything larger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Identifies the protocol step this frame belongs to.
    pub tag: MessageTag,
    /// Raw value bytes; exactly `length` bytes on the wire.
    pub value: Vec<u8>,
}

impl Frame {
    /// Creates a frame, rejecting values that cannot be expressed on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PayloadTooLarge`] when `value` exceeds 65535 bytes.
    pub fn new(tag: MessageTag, value: Vec<u8>) -> Result<Self, FrameError> {
        if value.len() > MAX_PAYLOAD {
            return Err(FrameError::PayloadTooLarge(value.len()));
        }
        Ok(Self { tag, value })
    }

    /// Creates a frame with an empty value.
    pub fn empty(tag: MessageTag) -> Self {
        Self {
            tag,
            value: Vec::new(),
        }
    }
}

// ── Byte-level codec ──────────────────────────────────────────────────────────

/// Encodes one frame into a byte vector including the 3-byte header.
///
/// # Errors
///
/// Returns [`FrameError::PayloadTooLarge`] when `value` exceeds 65535 bytes.
pub fn encode_frame(tag: MessageTag, value: &[u8]) -> Result<Vec<u8>, FrameError> {
    if value.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge(value.len()));
    }
    let len = value.len() as u16;

    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + value.len());
    buf.push(tag as u8);
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(value);
    Ok(buf)
}

/// Decodes one frame from the beginning of `bytes`.
///
/// Returns the decoded frame and the total number of bytes consumed
/// (header + value), so the caller can advance their read cursor.
///
/// # Errors
///
/// Returns [`FrameError::Truncated`] when `bytes` ends before the full frame,
/// and [`FrameError::UnknownTag`] for an unrecognized tag byte.
pub fn decode_frame(bytes: &[u8]) -> Result<(Frame, usize), FrameError> {
    if bytes.len() < FRAME_HEADER_SIZE {
        return Err(FrameError::Truncated {
            expected: FRAME_HEADER_SIZE - bytes.len(),
        });
    }

    let tag = MessageTag::try_from(bytes[0]).map_err(|_| FrameError::UnknownTag(bytes[0]))?;
    let len = u16::from_be_bytes([bytes[1], bytes[2]]) as usize;

    let total = FRAME_HEADER_SIZE + len;
    if bytes.len() < total {
        return Err(FrameError::Truncated {
            expected: total - bytes.len(),
        });
    }

    let value = bytes[FRAME_HEADER_SIZE..total].to_vec();
    Ok((Frame { tag, value }, total))
}

// ── Stream-level codec ────────────────────────────────────────────────────────

/// Reads exactly one frame from `reader`, blocking until it is complete.
///
/// # Errors
///
/// - [`FrameError::EndOfStream`] when the peer closes the stream cleanly at a
///   frame boundary (zero header bytes read).
/// - [`FrameError::Truncated`] when the stream closes mid-header or mid-value.
/// - [`FrameError::UnknownTag`] for an unrecognized tag byte.
/// - [`FrameError::Io`] for any other transport failure.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; FRAME_HEADER_SIZE];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            return Err(if filled == 0 {
                FrameError::EndOfStream
            } else {
                FrameError::Truncated {
                    expected: header.len() - filled,
                }
            });
        }
        filled += n;
    }

    let tag = MessageTag::try_from(header[0]).map_err(|_| FrameError::UnknownTag(header[0]))?;
    let len = u16::from_be_bytes([header[1], header[2]]) as usize;

    let mut value = vec![0u8; len];
    if len > 0 {
        reader.read_exact(&mut value).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                FrameError::Truncated { expected: len }
            } else {
                FrameError::Io(e)
            }
        })?;
    }

    Ok(Frame { tag, value })
}

/// Encodes and writes one frame to `writer`, flushing afterwards.
///
/// # Errors
///
/// Returns [`FrameError::PayloadTooLarge`] for oversized values and
/// [`FrameError::Io`] for transport failures.
pub async fn write_frame<W>(writer: &mut W, tag: MessageTag, value: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = encode_frame(tag, value)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

// ── Scalar helpers ────────────────────────────────────────────────────────────

/// Encodes a scalar as 4 big-endian bytes.
pub fn encode_u32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decodes a 4-byte big-endian scalar.
///
/// Returns `None` unless `bytes` is exactly 4 bytes long, so callers never
/// read a scalar out of a wrong-length payload by accident.
pub fn decode_u32(bytes: &[u8]) -> Option<u32> {
    let arr: [u8; 4] = bytes.try_into().ok()?;
    Some(u32::from_be_bytes(arr))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
