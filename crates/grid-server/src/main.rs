//! Grid-Over-TCP server entry point.
//!
//! Wires together configuration, structured logging, the session listener,
//! and the two shutdown triggers, then runs the Tokio async runtime.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- grid-server.toml, defaults when absent
//!  └─ Server::bind()         -- TCP listener
//!  └─ shutdown triggers
//!       ├─ Ctrl-C signal
//!       └─ "stop" on stdin
//!  └─ Server::run()          -- accept loop + session drain
//! ```

use std::path::Path;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use grid_server::config::{load_config, DEFAULT_CONFIG_FILE};
use grid_server::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("GRID_SERVER_CONFIG")
        .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let config = load_config(Path::new(&config_path))?;

    // Initialise structured logging. `RUST_LOG` wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    info!("Grid-Over-TCP server starting");

    let server = Server::bind(&config).await?;

    // Shutdown flag shared by the accept loop and both triggers.
    let running = Arc::new(AtomicBool::new(true));

    // ── Ctrl-C / SIGTERM handler ──────────────────────────────────────────────
    let running_signal = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_signal.store(false, Ordering::Relaxed);
        }
    });

    // ── Console control ───────────────────────────────────────────────────────
    // Typing "stop" on the server console also requests shutdown.
    let running_console = Arc::clone(&running);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().eq_ignore_ascii_case("stop") => {
                    info!("stop command received on console");
                    running_console.store(false, Ordering::Relaxed);
                    break;
                }
                Ok(Some(_)) => {
                    info!("unrecognised console input; type 'stop' to stop the server");
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("console input error: {e}");
                    break;
                }
            }
        }
    });

    info!("ready; press Ctrl-C or type 'stop' to shut down");
    server.run(running).await?;

    info!("Grid-Over-TCP server stopped");
    Ok(())
}
