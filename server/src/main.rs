// server/src/main.rs

// Entry point for the MediStaff server: loads configuration, opens the
// stores and serves the REST API until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use lib::config::{AppConfig, ConfigOverrides};
use lib::storage_engine::{create_storage, FileStorage};
use rest_api::{app_router, start_server, AppState};
use security::SessionKeys;

mod logging;

#[derive(Parser, Debug)]
#[command(name = "medistaff-server")]
#[command(version)]
#[command(about = "REST backend for clinic staff management")]
struct Cli {
    /// Configuration file (TOML or YAML). Defaults to ./medistaff.{toml,yaml} if present.
    #[arg(short = 'c', long = "config", value_name = "FILE", env = "MEDISTAFF_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long = "host", value_name = "HOST")]
    host: Option<String>,
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    port: Option<u16>,
    #[arg(long = "database-path", value_name = "PATH")]
    database_path: Option<PathBuf>,
    #[arg(long = "upload-dir", value_name = "DIR")]
    upload_dir: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            database_path: self.database_path.clone(),
            upload_dir: self.upload_dir.clone(),
        }
    }
}

async fn resolve_bind_address(address: &str) -> Result<SocketAddr> {
    tokio::net::lookup_host(address)
        .await
        .with_context(|| format!("Failed to resolve bind address {}", address))?
        .next()
        .ok_or_else(|| anyhow!("Bind address {} resolved to nothing", address))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal outside development.
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref(), &cli.overrides())?;
    logging::init(&config.log_level);
    info!(?config, "Starting MediStaff server");

    let stores = create_storage(&config).context("Failed to open storage")?;
    let files = FileStorage::new(config.upload_dir.clone(), config.staging_dir.clone(), config.max_upload_bytes)
        .await
        .context("Failed to prepare upload storage")?;
    let sessions = SessionKeys::new(config.jwt_secret.as_bytes(), config.token_ttl());
    info!(ttl_hours = sessions.ttl().num_hours(), "Session keys ready");

    let app = app_router(AppState::new(stores, files, sessions));
    let addr = resolve_bind_address(&config.bind_address()).await?;
    start_server(addr, app, shutdown_signal()).await
}
