//! Session-layer error taxonomy and the ordered-exchange helpers shared by
//! both peers.
//!
//! The protocol is a fixed ten-step sequence; there is no retry and no
//! resynchronization. Every helper here returns a typed [`SessionError`] and
//! the caller propagates it by early return, which tears the session down.
//! One malformed or out-of-order message is fatal to that session only.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::trace;

use crate::protocol::frame::{read_frame, write_frame, Frame, FrameError};
use crate::protocol::messages::{MessageTag, MAX_MATRIX_CHUNK};
use thiserror::Error;

/// Fatal session outcomes. Each one ends the session; none are retried.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Truncated or unparsable TLV header or body.
    #[error("malformed frame: {0}")]
    Malformed(#[source] FrameError),

    /// A well-formed frame arrived with the wrong tag for the current step.
    #[error("protocol violation: expected {expected}, received {received}")]
    ProtocolViolation {
        expected: MessageTag,
        received: MessageTag,
    },

    /// SET_CONFIG carried a wrong-length payload or an out-of-range count.
    #[error("invalid worker count {got:?}; expected a 4-byte value in 1..=64")]
    InvalidConfig { got: Option<u32> },

    /// SET_SIZE carried a wrong-length payload or an out-of-range side length.
    #[error("invalid matrix size {got:?}; expected a 4-byte value in 1..=1000")]
    InvalidSize { got: Option<u32> },

    /// A matrix payload did not add up to the announced `size² × 4` bytes.
    #[error("invalid matrix data: expected {expected} bytes, received {received}")]
    InvalidData { expected: usize, received: usize },

    /// The peer closed the connection or the transport failed mid-session.
    #[error("transport closed")]
    TransportClosed(#[source] Option<std::io::Error>),

    /// The blocking worker-pool task failed to run to completion.
    #[error("matrix execution failed: {0}")]
    Execution(String),
}

impl From<FrameError> for SessionError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::EndOfStream => SessionError::TransportClosed(None),
            FrameError::Io(e) => SessionError::TransportClosed(Some(e)),
            other => SessionError::Malformed(other),
        }
    }
}

// ── Ordered-exchange helpers ──────────────────────────────────────────────────

/// Reads the next frame and requires it to carry `expected`.
///
/// # Errors
///
/// Any frame-level failure maps through [`SessionError::from`]; a well-formed
/// frame with a different tag is a [`SessionError::ProtocolViolation`].
pub async fn expect_frame<R>(reader: &mut R, expected: MessageTag) -> Result<Frame, SessionError>
where
    R: AsyncRead + Unpin,
{
    let frame = read_frame(reader).await?;
    if frame.tag != expected {
        return Err(SessionError::ProtocolViolation {
            expected,
            received: frame.tag,
        });
    }
    trace!(tag = %frame.tag, len = frame.value.len(), "frame received");
    Ok(frame)
}

/// Reads a matrix payload of exactly `expected_total` bytes under `tag`.
///
/// A payload that fits one frame must arrive in one frame carrying exactly
/// `expected_total` bytes. A larger payload arrives as consecutive frames of
/// the same tag; each chunk must be a non-empty whole number of 4-byte cells
/// and must not overshoot the bytes still outstanding.
///
/// # Errors
///
/// [`SessionError::InvalidData`] for any length rule above;
/// [`SessionError::ProtocolViolation`] if a different tag interleaves.
pub async fn read_matrix_payload<R>(
    reader: &mut R,
    tag: MessageTag,
    expected_total: usize,
) -> Result<Vec<u8>, SessionError>
where
    R: AsyncRead + Unpin,
{
    let single_frame = expected_total <= MAX_MATRIX_CHUNK;
    let mut buf = Vec::with_capacity(expected_total);

    while buf.len() < expected_total {
        let frame = expect_frame(reader, tag).await?;
        let chunk = frame.value.len();
        let outstanding = expected_total - buf.len();

        let valid = if single_frame {
            chunk == expected_total
        } else {
            chunk > 0 && chunk % 4 == 0 && chunk <= outstanding
        };
        if !valid {
            return Err(SessionError::InvalidData {
                expected: expected_total,
                received: buf.len() + chunk,
            });
        }
        buf.extend_from_slice(&frame.value);
    }

    Ok(buf)
}

/// Writes a matrix payload under `tag`, splitting it into frames of at most
/// [`MAX_MATRIX_CHUNK`] bytes. The peer reassembles by byte count, so no
/// explicit continuation marker is needed.
///
/// # Errors
///
/// Transport failures map to [`SessionError::TransportClosed`].
pub async fn write_matrix_payload<W>(
    writer: &mut W,
    tag: MessageTag,
    bytes: &[u8],
) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
{
    for chunk in bytes.chunks(MAX_MATRIX_CHUNK) {
        write_frame(writer, tag, chunk).await?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
