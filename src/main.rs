use std::sync::Arc;

use tracing::{info, warn};

use squad_reliability::config::Config;
use squad_reliability::service::ReliabilityService;
use squad_reliability::web::server::WebServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "squad_reliability=info".into()),
        )
        .init();

    info!("🎮 squad-reliability v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load config; a missing default file falls back to built-in defaults
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let config = Config::load(&path)?;
            info!("Config loaded from {}", path);
            config
        }
        None if std::path::Path::new("squad-reliability.toml").exists() => {
            let config = Config::load("squad-reliability.toml")?;
            info!("Config loaded from squad-reliability.toml");
            config
        }
        None => {
            info!("No config file given, using defaults");
            Config::default()
        }
    };

    let service = Arc::new(ReliabilityService::new(config));
    let web = WebServer::new(service.clone(), service.config.clone());

    web.run(shutdown_signal()).await?;
    info!("Shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
    }
}
