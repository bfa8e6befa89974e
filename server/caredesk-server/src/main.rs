use anyhow::{Context, Result};
use caredesk_server::{create_app, CareDeskServer};
use clap::Parser;
use config_engine::ConfigLoader;
use tracing::info;

/// CareDesk Engine HTTP Server
#[derive(Parser, Debug)]
#[command(name = "caredesk-server")]
#[command(about = "Hospital administration API: billing, insurance, pharmacy and records")]
struct Args {
    /// Configuration file path (YAML, TOML or JSON)
    #[arg(short, long, default_value = "caredesk.yaml")]
    config: String,

    /// Override the configured bind address
    #[arg(long)]
    host: Option<String>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ConfigLoader::new()
        .with_dotenv()
        .with_file(&args.config)
        .load()
        .with_context(|| format!("loading configuration from {}", args.config))?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.verbose {
        config.logging.level = "debug".to_string();
    }

    logger_redacted::init_tracing(&config.logging).context("initializing logging")?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting CareDesk Engine server");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let server = CareDeskServer::new(config).await?;
    info!(backend = server.db.backend(), "Store ready");

    let app = create_app(server);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    info!(address = %addr, "CareDesk Engine listening; API under /api/v1");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
