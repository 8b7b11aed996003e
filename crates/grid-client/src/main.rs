//! Grid-Over-TCP client entry point.
//!
//! Loads the configuration, generates a random matrix, runs the session
//! protocol once against the configured server, and reports the outcome.

use std::path::Path;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use grid_client::config::{load_config, DEFAULT_CONFIG_FILE};
use grid_client::connection::run_once;
use grid_client::generator::UniformRandomSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("GRID_CLIENT_CONFIG")
        .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let config = load_config(Path::new(&config_path))?;
    config.validate()?;

    // Initialise structured logging. `RUST_LOG` wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.client.log_level.clone())),
        )
        .init();

    info!(
        server = %config.connection.server_addr,
        workers = config.job.workers,
        size = config.job.matrix_size,
        "Grid-Over-TCP client starting"
    );

    let mut source = UniformRandomSource::new();
    match run_once(
        &config.connection.server_addr,
        config.job.workers,
        config.job.matrix_size,
        &mut source,
    )
    .await
    {
        Ok(report) => {
            info!(
                elapsed_ms = report.elapsed_ms,
                size = report.received.size(),
                "session completed"
            );
            // Small matrices are worth showing in full.
            if report.received.size() <= 8 {
                for r in 0..report.received.size() {
                    info!(row = r, cells = ?report.received.row(r));
                }
            }
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "session failed");
            Err(e.into())
        }
    }
}
