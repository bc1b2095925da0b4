//! webfront server binary.
//!
//! ```text
//!     Client ──▶ sequence ──▶ access log ──▶ robots ──▶ panic barrier
//!                                                          │
//!                                   primary router ◀───────┘
//!                                         │ miss
//!                                         ▼
//!                                   alternate router ──▶ 404
//! ```

use std::path::PathBuf;

use clap::Parser;

use webfront::config::{load_config, ServerConfig};
use webfront::observability::{logging, metrics};
use webfront::{StatusService, WebServer};

#[derive(Parser, Debug)]
#[command(name = "webfront", version, about = "HTTP front layer with request classification")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability, &config.access_log)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        access_log = config.access_log.enabled,
        alt_match_method = config.alt_routes.match_method,
        "webfront starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut server = WebServer::new(config)?;
    server.register("", StatusService)?;
    server.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
