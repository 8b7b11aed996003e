//! Integration tests exercising the public protocol API end to end: frame
//! round trips over an in-memory stream, chunked matrix transfer, and a full
//! mirrored session exchange without any real socket.

use grid_core::protocol::session::{
    expect_frame, read_matrix_payload, write_matrix_payload, SessionError,
};
use grid_core::{
    decode_u32, encode_u32, pool, read_frame, write_frame, Frame, FrameError, Matrix, MessageTag,
    EXEC_STARTED_MARKER, MAX_PAYLOAD,
};

// ── Frame layer ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn frame_lengths_from_zero_to_max_round_trip() {
    let (mut a, mut b) = tokio::io::duplex(256 * 1024);

    for len in [0usize, 1, 2, 255, 256, 4096, MAX_PAYLOAD - 1, MAX_PAYLOAD] {
        let value: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
        write_frame(&mut a, MessageTag::SendData, &value)
            .await
            .expect("write");
        let frame = read_frame(&mut b).await.expect("read");
        assert_eq!(frame.tag, MessageTag::SendData);
        assert_eq!(frame.value, value, "len={len}");
    }
}

#[tokio::test]
async fn scalar_frames_round_trip() {
    let (mut a, mut b) = tokio::io::duplex(64);

    for value in [1u32, 8, 64, 1000, u32::MAX] {
        write_frame(&mut a, MessageTag::SetConfig, &encode_u32(value))
            .await
            .expect("write");
        let frame = expect_frame(&mut b, MessageTag::SetConfig)
            .await
            .expect("read");
        assert_eq!(decode_u32(&frame.value), Some(value));
    }
}

#[tokio::test]
async fn oversized_frame_is_rejected_before_hitting_the_wire() {
    let err = Frame::new(MessageTag::SendData, vec![0u8; MAX_PAYLOAD + 1]).unwrap_err();
    assert!(matches!(err, FrameError::PayloadTooLarge(_)));
}

// ── Full mirrored exchange ────────────────────────────────────────────────────

/// Drives the server half of the protocol over an arbitrary duplex stream.
async fn serve_one_session<S>(mut stream: S) -> Result<(), SessionError>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    expect_frame(&mut stream, MessageTag::Hello).await?;
    write_frame(&mut stream, MessageTag::Welcome, b"WELCOME").await?;

    let frame = expect_frame(&mut stream, MessageTag::SetConfig).await?;
    let workers = decode_u32(&frame.value).ok_or(SessionError::InvalidConfig { got: None })?;

    let frame = expect_frame(&mut stream, MessageTag::SetSize).await?;
    let size = decode_u32(&frame.value).ok_or(SessionError::InvalidSize { got: None })?;

    let wire_len = (size * size * 4) as usize;
    let bytes = read_matrix_payload(&mut stream, MessageTag::SendData, wire_len).await?;
    let mut matrix = Matrix::from_be_bytes(size as usize, &bytes)
        .map_err(|_| SessionError::InvalidData {
            expected: wire_len,
            received: bytes.len(),
        })?;

    write_frame(&mut stream, MessageTag::ExecStarted, &[EXEC_STARTED_MARKER]).await?;
    let elapsed = pool::run(&mut matrix, workers);
    let elapsed_ms = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
    write_frame(&mut stream, MessageTag::ExecResult, &encode_u32(elapsed_ms)).await?;
    write_matrix_payload(&mut stream, MessageTag::MatrixResult, &matrix.to_be_bytes()).await?;

    expect_frame(&mut stream, MessageTag::ClientExit).await?;
    write_frame(&mut stream, MessageTag::Bye, &[]).await?;
    Ok(())
}

#[tokio::test]
async fn mirrored_session_transforms_the_documented_example() {
    let (server_io, mut client) = tokio::io::duplex(64 * 1024);
    let server = tokio::spawn(serve_one_session(server_io));

    let matrix = Matrix::from_rows(vec![vec![5, 1, 9], vec![2, 8, 3], vec![7, 6, 4]]).unwrap();

    write_frame(&mut client, MessageTag::Hello, b"HELLO")
        .await
        .unwrap();
    expect_frame(&mut client, MessageTag::Welcome).await.unwrap();
    write_frame(&mut client, MessageTag::SetConfig, &encode_u32(4))
        .await
        .unwrap();
    write_frame(&mut client, MessageTag::SetSize, &encode_u32(3))
        .await
        .unwrap();
    write_matrix_payload(&mut client, MessageTag::SendData, &matrix.to_be_bytes())
        .await
        .unwrap();

    let started = expect_frame(&mut client, MessageTag::ExecStarted)
        .await
        .unwrap();
    assert_eq!(started.value, &[EXEC_STARTED_MARKER]);

    let result = expect_frame(&mut client, MessageTag::ExecResult)
        .await
        .unwrap();
    let elapsed_ms = decode_u32(&result.value).expect("elapsed must be 4 bytes");
    assert!(elapsed_ms < 60_000, "elapsed must be a plausible duration");

    let bytes = read_matrix_payload(&mut client, MessageTag::MatrixResult, 36)
        .await
        .unwrap();
    let transformed = Matrix::from_be_bytes(3, &bytes).unwrap();
    assert_eq!(transformed.row(0), &[5, 9, 1]);
    assert_eq!(transformed.row(1), &[8, 2, 3]);
    assert_eq!(transformed.row(2), &[4, 6, 7]);

    write_frame(&mut client, MessageTag::ClientExit, &[])
        .await
        .unwrap();
    expect_frame(&mut client, MessageTag::Bye).await.unwrap();

    server.await.unwrap().expect("server half must complete");
}

#[tokio::test]
async fn mirrored_session_carries_a_multi_frame_matrix() {
    let (server_io, mut client) = tokio::io::duplex(64 * 1024);
    let server = tokio::spawn(serve_one_session(server_io));

    // 150×150 cells: 90 000 wire bytes, so SEND_DATA and MATRIX_RESULT both
    // split across two frames.
    let size = 150usize;
    let cells: Vec<i32> = (0..size * size).map(|i| ((i * 31) % 977) as i32).collect();
    let matrix = Matrix::from_cells(size, cells).unwrap();

    let mut reference = matrix.clone();
    pool::run(&mut reference, 1);

    write_frame(&mut client, MessageTag::Hello, b"HELLO")
        .await
        .unwrap();
    expect_frame(&mut client, MessageTag::Welcome).await.unwrap();
    write_frame(&mut client, MessageTag::SetConfig, &encode_u32(8))
        .await
        .unwrap();
    write_frame(&mut client, MessageTag::SetSize, &encode_u32(size as u32))
        .await
        .unwrap();
    write_matrix_payload(&mut client, MessageTag::SendData, &matrix.to_be_bytes())
        .await
        .unwrap();

    expect_frame(&mut client, MessageTag::ExecStarted).await.unwrap();
    expect_frame(&mut client, MessageTag::ExecResult).await.unwrap();

    let bytes = read_matrix_payload(&mut client, MessageTag::MatrixResult, size * size * 4)
        .await
        .unwrap();
    let transformed = Matrix::from_be_bytes(size, &bytes).unwrap();
    assert_eq!(transformed, reference);

    write_frame(&mut client, MessageTag::ClientExit, &[])
        .await
        .unwrap();
    expect_frame(&mut client, MessageTag::Bye).await.unwrap();

    server.await.unwrap().expect("server half must complete");
}
