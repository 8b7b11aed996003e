//! Per-connection session handler: drives the server half of the protocol
//! from greeting to goodbye.
//!
//! Each handler owns its socket, its configuration values, and its matrix
//! outright; nothing is shared with other sessions. Any validation failure is
//! fatal to this session only: the error is logged, nothing further is
//! written, and the socket is dropped.

use std::net::SocketAddr;

use grid_core::protocol::session::{
    expect_frame, read_matrix_payload, write_matrix_payload, SessionError,
};
use grid_core::{
    decode_u32, encode_u32, pool, write_frame, Matrix, MessageTag, EXEC_STARTED_MARKER,
    MAX_MATRIX_SIZE, MAX_WORKERS,
};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Outcome of a completed session, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Worker count the client configured.
    pub workers: u32,
    /// Matrix side length the client configured.
    pub size: u32,
    /// Elapsed milliseconds of the parallel phase.
    pub elapsed_ms: u32,
}

/// Runs one session to completion and logs the outcome.
///
/// This is the task body spawned per accepted connection; it never returns an
/// error to the accept loop because a session failure must not affect other
/// sessions or the listener.
pub async fn handle_session(stream: TcpStream, peer: SocketAddr) {
    let session_id = Uuid::new_v4();
    let span = info_span!("session", %session_id, %peer);

    async move {
        info!("session opened");
        match run_session(stream).await {
            Ok(summary) => {
                info!(
                    workers = summary.workers,
                    size = summary.size,
                    elapsed_ms = summary.elapsed_ms,
                    "session completed"
                );
            }
            Err(e) => {
                error!(error = %e, "session aborted");
            }
        }
    }
    .instrument(span)
    .await
}

/// The server half of the ordered exchange.
///
/// The protocol position is carried by control flow: each step reads or
/// writes exactly one message and any typed failure propagates out by early
/// return, ending the session without replies or resynchronization.
async fn run_session(mut stream: TcpStream) -> Result<SessionSummary, SessionError> {
    // 1. Greeting. The payload is opaque; only presence and order matter.
    expect_frame(&mut stream, MessageTag::Hello).await?;
    write_frame(&mut stream, MessageTag::Welcome, b"WELCOME").await?;

    // 2. Worker count: 4 bytes, 1..=MAX_WORKERS.
    let frame = expect_frame(&mut stream, MessageTag::SetConfig).await?;
    let workers = decode_u32(&frame.value).ok_or(SessionError::InvalidConfig { got: None })?;
    if workers == 0 || workers > MAX_WORKERS {
        return Err(SessionError::InvalidConfig { got: Some(workers) });
    }
    info!(workers, "worker count accepted");

    // 3. Matrix side length: 4 bytes, 1..=MAX_MATRIX_SIZE.
    let frame = expect_frame(&mut stream, MessageTag::SetSize).await?;
    let size = decode_u32(&frame.value).ok_or(SessionError::InvalidSize { got: None })?;
    if size == 0 || size > MAX_MATRIX_SIZE {
        return Err(SessionError::InvalidSize { got: Some(size) });
    }
    info!(size, "matrix size accepted");

    // 4. Matrix transfer: exactly size² cells of 4 bytes, chunked when large.
    let wire_len = size as usize * size as usize * 4;
    let bytes = read_matrix_payload(&mut stream, MessageTag::SendData, wire_len).await?;
    let mut matrix =
        Matrix::from_be_bytes(size as usize, &bytes).map_err(|_| SessionError::InvalidData {
            expected: wire_len,
            received: bytes.len(),
        })?;
    info!("matrix received");

    // 5. Acknowledge before dispatching the workers.
    write_frame(&mut stream, MessageTag::ExecStarted, &[EXEC_STARTED_MARKER]).await?;

    // 6. Run the CPU-bound pool off the async reactor. The matrix moves into
    // the blocking task and back out with the measured duration.
    let (matrix, elapsed) = tokio::task::spawn_blocking(move || {
        let elapsed = pool::run(&mut matrix, workers);
        (matrix, elapsed)
    })
    .await
    .map_err(|e| SessionError::Execution(e.to_string()))?;
    let elapsed_ms = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
    info!(elapsed_ms, "execution finished");

    // 7. Report the elapsed time, then the transformed matrix.
    write_frame(&mut stream, MessageTag::ExecResult, &encode_u32(elapsed_ms)).await?;
    write_matrix_payload(&mut stream, MessageTag::MatrixResult, &matrix.to_be_bytes()).await?;

    // 8. Termination.
    expect_frame(&mut stream, MessageTag::ClientExit).await?;
    write_frame(&mut stream, MessageTag::Bye, &[]).await?;
    stream
        .shutdown()
        .await
        .map_err(|e| SessionError::TransportClosed(Some(e)))?;

    Ok(SessionSummary {
        workers,
        size,
        elapsed_ms,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_summary_is_copyable_for_logging() {
        let summary = SessionSummary {
            workers: 4,
            size: 3,
            elapsed_ms: 0,
        };
        let copy = summary;
        assert_eq!(copy, summary);
    }
}
