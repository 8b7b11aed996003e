//! Session listener: accept loop and per-session task management.
//!
//! Each accepted connection is handed to its own Tokio task so one slow
//! client never blocks another; the accept loop itself never blocks for long
//! because `accept` is polled with a short timeout, which is also how the
//! shutdown flag is observed promptly.
//!
//! Shutdown is cooperative: once the shared flag is cleared the loop stops
//! accepting new connections, then waits for every in-flight session to run
//! to its natural end. A handshake that is under way when shutdown is
//! requested still completes.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::session::handle_session;

/// A bound session listener, ready to run.
///
/// Binding is separated from running so callers (and tests) can learn the
/// actual local address before any client connects, which matters when the
/// configured port is 0.
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Binds the listener described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (port in use,
    /// insufficient permissions, unparsable address).
    pub async fn bind(config: &ServerConfig) -> anyhow::Result<Self> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind session listener on {addr}"))?;
        info!("listening on {}", listener.local_addr()?);
        Ok(Self { listener })
    }

    /// The address the listener actually bound.
    ///
    /// # Errors
    ///
    /// Propagates the OS error if the socket has no local address.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until `running` is cleared, then drains in-flight
    /// sessions.
    ///
    /// # Errors
    ///
    /// Never fails after a successful bind; transient accept errors are
    /// logged and the loop continues.
    pub async fn run(self, running: Arc<AtomicBool>) -> anyhow::Result<()> {
        let mut sessions = JoinSet::new();

        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown requested; no longer accepting connections");
                break;
            }

            // Reap sessions that already finished so the set does not grow
            // for the lifetime of a long-running server.
            while sessions.try_join_next().is_some() {}

            // A short timeout keeps the loop responsive to the shutdown flag
            // even when no clients are connecting.
            match timeout(Duration::from_millis(200), self.listener.accept()).await {
                Ok(Ok((stream, peer))) => {
                    info!(%peer, "connection accepted");
                    sessions.spawn(handle_session(stream, peer));
                }
                Ok(Err(e)) => {
                    // Transient accept failure (e.g. fd exhaustion): keep serving.
                    error!("accept error: {e}");
                }
                Err(_) => {
                    // Timeout: no connection in this window.
                }
            }
        }

        if !sessions.is_empty() {
            info!(in_flight = sessions.len(), "waiting for in-flight sessions");
        }
        while let Some(joined) = sessions.join_next().await {
            if let Err(e) = joined {
                warn!("session task failed to join: {e}");
            }
        }
        info!("all sessions drained");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
