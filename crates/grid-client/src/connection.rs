//! Client half of the session protocol.
//!
//! Opens a single TCP connection, drives the ten-step exchange once, and
//! closes. There is no reconnect loop and no retry: any failure at any step
//! is reported as a typed error and the session is over.

use std::net::SocketAddr;

use grid_core::protocol::session::{
    expect_frame, read_matrix_payload, write_matrix_payload, SessionError,
};
use grid_core::{decode_u32, encode_u32, write_frame, Matrix, MessageTag, EXEC_STARTED_MARKER};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::generator::MatrixSource;

/// Errors that can occur in the client network layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured server address could not be parsed.
    #[error("invalid server address {addr:?}: {source}")]
    BadAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// The TCP connection to the server failed.
    #[error("failed to connect to server at {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// A protocol step failed; the session is over.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// EXEC_STARTED arrived without its 1-byte marker.
    #[error("malformed EXEC_STARTED marker ({got} bytes)")]
    BadExecStarted { got: usize },

    /// EXEC_RESULT did not carry a 4-byte elapsed time.
    #[error("malformed EXEC_RESULT payload ({got} bytes; expected 4)")]
    BadExecResult { got: usize },
}

/// Everything the client learns from one completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Elapsed milliseconds of the server's parallel phase.
    pub elapsed_ms: u32,
    /// The matrix as sent to the server.
    pub sent: Matrix,
    /// The transformed matrix returned by the server.
    pub received: Matrix,
}

/// Runs one complete session against the server at `server_addr`.
///
/// The matrix is drawn from `source` at the transfer step, after the
/// configuration has been accepted on the wire.
///
/// # Errors
///
/// Returns [`ClientError`] for connection failures and for any deviation the
/// server makes from the expected reply sequence.
pub async fn run_once(
    server_addr: &str,
    workers: u32,
    size: u32,
    source: &mut dyn MatrixSource,
) -> Result<RunReport, ClientError> {
    let addr: SocketAddr = server_addr.parse().map_err(|source| ClientError::BadAddress {
        addr: server_addr.to_string(),
        source,
    })?;

    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::ConnectFailed { addr, source })?;
    info!(%addr, "connected");

    let report = drive_session(&mut stream, workers, size, source).await?;

    // Graceful close after BYE; the server is already gone by now, so a
    // failure here is not worth more than a debug line.
    if let Err(e) = stream.shutdown().await {
        debug!("socket shutdown after BYE: {e}");
    }
    Ok(report)
}

/// The ordered client half, step by step, over an established stream.
async fn drive_session(
    stream: &mut TcpStream,
    workers: u32,
    size: u32,
    source: &mut dyn MatrixSource,
) -> Result<RunReport, ClientError> {
    // 1. Greeting.
    write_frame(stream, MessageTag::Hello, b"HELLO")
        .await
        .map_err(SessionError::from)?;
    expect_frame(stream, MessageTag::Welcome).await?;
    debug!("greeting complete");

    // 2. Configuration, in protocol order: workers first, then size.
    write_frame(stream, MessageTag::SetConfig, &encode_u32(workers))
        .await
        .map_err(SessionError::from)?;
    write_frame(stream, MessageTag::SetSize, &encode_u32(size))
        .await
        .map_err(SessionError::from)?;

    // 3. Matrix transfer.
    let sent = source.generate(size as usize);
    write_matrix_payload(stream, MessageTag::SendData, &sent.to_be_bytes()).await?;
    info!(size, workers, "matrix sent");

    // 4. Execution acknowledgement and result.
    let started = expect_frame(stream, MessageTag::ExecStarted).await?;
    if started.value != [EXEC_STARTED_MARKER] {
        return Err(ClientError::BadExecStarted {
            got: started.value.len(),
        });
    }

    let result = expect_frame(stream, MessageTag::ExecResult).await?;
    let elapsed_ms = decode_u32(&result.value).ok_or(ClientError::BadExecResult {
        got: result.value.len(),
    })?;
    info!(elapsed_ms, "server finished execution");

    // 5. Transformed matrix, validated against the announced dimensions.
    let wire_len = sent.wire_len();
    let bytes = read_matrix_payload(stream, MessageTag::MatrixResult, wire_len).await?;
    let received = Matrix::from_be_bytes(size as usize, &bytes).map_err(|_| {
        SessionError::InvalidData {
            expected: wire_len,
            received: bytes.len(),
        }
    })?;

    // 6. Termination.
    write_frame(stream, MessageTag::ClientExit, &[])
        .await
        .map_err(SessionError::from)?;
    expect_frame(stream, MessageTag::Bye).await?;
    debug!("session closed by BYE");

    Ok(RunReport {
        elapsed_ms,
        sent,
        received,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
