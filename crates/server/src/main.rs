use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use vanish_gateway::ShareGateway;
use vanish_server::api::AppState;
use vanish_server::config::VanishConfig;
use vanish_server::{ServerError, blob_factory, state_factory};

/// Vanish ephemeral file sharing HTTP server.
#[derive(Parser, Debug)]
#[command(name = "vanish-server", about = "Standalone HTTP server for vanish")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "vanish.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from the TOML file, or fall back to defaults.
    let config: VanishConfig = if Path::new(&cli.config).exists() {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        toml::from_str("")?
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if !Path::new(&cli.config).exists() {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    // Each backend is connectivity-checked before the server accepts work.
    let meta = state_factory::create_meta_store(&config.state).await?;
    let blobs = blob_factory::create_blob_store(&config.blob).await?;

    let gateway = ShareGateway::builder()
        .meta_store(meta)
        .blob_store(blobs)
        .policy(config.share.policy())
        .build()
        .map_err(|e| ServerError::Config(e.to_string()))?;

    let state = AppState {
        gateway: Arc::new(gateway),
        max_upload_bytes: config.share.max_upload_bytes,
        cors_origins: config.cors.origins.clone(),
    };
    let app = vanish_server::api::router(state);

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "vanish-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM. In-flight download
    // streams finish at the client's pace; their drop-guard cleanups are
    // spawned before the runtime winds down.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("vanish-server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
