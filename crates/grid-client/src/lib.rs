//! grid-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! The client is the requesting side of Grid-Over-TCP: it generates a square
//! integer matrix, opens a single TCP connection, drives the client half of
//! the session protocol exactly once, and reports the server's measured
//! execution time together with the transformed matrix.

pub mod config;
pub mod connection;
pub mod generator;
