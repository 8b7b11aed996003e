//! Message tags and protocol limits for the Grid-Over-TCP session protocol.
//!
//! Tag numbering is fixed out of band and must be identical on both peers;
//! the values below are the canonical mapping used by this implementation.

// ── Protocol constants ────────────────────────────────────────────────────────

/// Size of the TLV frame header in bytes: tag (1) + length (2).
pub const FRAME_HEADER_SIZE: usize = 3;

/// Largest value a single frame can carry; bounded by the 16-bit length field.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Largest matrix chunk carried in one frame: the biggest multiple of 4 that
/// still fits the 16-bit length field, so a chunk always holds whole cells.
pub const MAX_MATRIX_CHUNK: usize = MAX_PAYLOAD - (MAX_PAYLOAD % 4);

/// Upper bound on the worker count a client may request.
pub const MAX_WORKERS: u32 = 64;

/// Upper bound on the matrix side length the server accepts.
pub const MAX_MATRIX_SIZE: u32 = 1000;

/// Marker byte carried by `ExecStarted`.
pub const EXEC_STARTED_MARKER: u8 = 0x00;

// ── Message tags ──────────────────────────────────────────────────────────────

/// All message tags defined by the session protocol, in exchange order.
///
/// The exchange is strictly sequential: each tag is only valid at its own
/// step, and the session layer treats anything else as a protocol violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageTag {
    /// Client opens the session; opaque payload.
    Hello = 0x00,
    /// Server acknowledges the greeting; opaque payload.
    Welcome = 0x01,
    /// Client sets the worker count (4-byte big-endian unsigned).
    SetConfig = 0x02,
    /// Client sets the matrix side length (4-byte big-endian unsigned).
    SetSize = 0x03,
    /// Client transfers the row-major matrix cells (possibly chunked).
    SendData = 0x04,
    /// Server confirms the matrix was accepted, before processing begins.
    ExecStarted = 0x05,
    /// Server reports elapsed milliseconds of the parallel phase.
    ExecResult = 0x06,
    /// Server returns the transformed matrix cells (possibly chunked).
    MatrixResult = 0x07,
    /// Client requests session termination; empty payload.
    ClientExit = 0x08,
    /// Server's final reply; empty payload, connection closes after it.
    Bye = 0x09,
}

impl TryFrom<u8> for MessageTag {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x00 => Ok(MessageTag::Hello),
            0x01 => Ok(MessageTag::Welcome),
            0x02 => Ok(MessageTag::SetConfig),
            0x03 => Ok(MessageTag::SetSize),
            0x04 => Ok(MessageTag::SendData),
            0x05 => Ok(MessageTag::ExecStarted),
            0x06 => Ok(MessageTag::ExecResult),
            0x07 => Ok(MessageTag::MatrixResult),
            0x08 => Ok(MessageTag::ClientExit),
            0x09 => Ok(MessageTag::Bye),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for MessageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MessageTag::Hello => "HELLO",
            MessageTag::Welcome => "WELCOME",
            MessageTag::SetConfig => "SET_CONFIG",
            MessageTag::SetSize => "SET_SIZE",
            MessageTag::SendData => "SEND_DATA",
            MessageTag::ExecStarted => "EXEC_STARTED",
            MessageTag::ExecResult => "EXEC_RESULT",
            MessageTag::MatrixResult => "MATRIX_RESULT",
            MessageTag::ClientExit => "CLIENT_EXIT",
            MessageTag::Bye => "BYE",
        };
        f.write_str(name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tag_round_trips_through_u8() {
        let tags = [
            MessageTag::Hello,
            MessageTag::Welcome,
            MessageTag::SetConfig,
            MessageTag::SetSize,
            MessageTag::SendData,
            MessageTag::ExecStarted,
            MessageTag::ExecResult,
            MessageTag::MatrixResult,
            MessageTag::ClientExit,
            MessageTag::Bye,
        ];
        for tag in tags {
            assert_eq!(MessageTag::try_from(tag as u8), Ok(tag));
        }
    }

    #[test]
    fn test_tags_use_canonical_numbering() {
        assert_eq!(MessageTag::Hello as u8, 0x00);
        assert_eq!(MessageTag::Welcome as u8, 0x01);
        assert_eq!(MessageTag::SetConfig as u8, 0x02);
        assert_eq!(MessageTag::SetSize as u8, 0x03);
        assert_eq!(MessageTag::SendData as u8, 0x04);
        assert_eq!(MessageTag::ExecStarted as u8, 0x05);
        assert_eq!(MessageTag::ExecResult as u8, 0x06);
        assert_eq!(MessageTag::MatrixResult as u8, 0x07);
        assert_eq!(MessageTag::ClientExit as u8, 0x08);
        assert_eq!(MessageTag::Bye as u8, 0x09);
    }

    #[test]
    fn test_unknown_tag_byte_is_rejected() {
        assert_eq!(MessageTag::try_from(0x0A), Err(()));
        assert_eq!(MessageTag::try_from(0xFF), Err(()));
    }

    #[test]
    fn test_max_matrix_chunk_is_a_whole_number_of_cells() {
        assert_eq!(MAX_MATRIX_CHUNK % 4, 0);
        assert!(MAX_MATRIX_CHUNK <= MAX_PAYLOAD);
        assert_eq!(MAX_MATRIX_CHUNK, 65532);
    }
}
