//! # grid-core
//!
//! Shared library for Grid-Over-TCP containing the TLV framing codec, the
//! session protocol state machine, and the row-partitioned matrix worker pool.
//!
//! This crate is used by both the server and client applications. It owns no
//! sockets and starts no runtime of its own; the only OS resource it touches
//! is `std::thread` inside the worker pool.
//!
//! # Architecture overview
//!
//! Grid-Over-TCP is a small compute service: a client ships a square integer
//! matrix to the server over a strictly ordered TLV exchange, the server
//! transforms the matrix in place across a configurable number of worker
//! threads, and the transformed matrix travels back along with the wall-clock
//! time of the parallel phase.
//!
//! This crate defines:
//!
//! - **`protocol`** – How bytes travel over the network. Each message is a
//!   TLV frame (1-byte tag, 2-byte big-endian length, raw value) and the
//!   session layer enforces the fixed ten-step exchange on top of it.
//!
//! - **`domain`** – Pure compute logic with no network dependencies: the
//!   row-major [`Matrix`] type and the worker pool that mutates it through
//!   disjoint row blocks.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `grid_core::Matrix` instead of `grid_core::domain::matrix::Matrix`.
pub use domain::matrix::{Matrix, MatrixError};
pub use domain::pool;
pub use protocol::frame::{
    decode_frame, decode_u32, encode_frame, encode_u32, read_frame, write_frame, Frame, FrameError,
};
pub use protocol::messages::{
    MessageTag, EXEC_STARTED_MARKER, MAX_MATRIX_CHUNK, MAX_MATRIX_SIZE, MAX_PAYLOAD, MAX_WORKERS,
};
pub use protocol::session::SessionError;
