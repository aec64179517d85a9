use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use braintree_client::{BraintreeClient, Environment};
use carlot_core::{AppConfig, BraintreeCredentials};
use carlot_domains::catalog::PgCatalogStore;
use carlot_domains::payments::{BraintreeGateway, PaymentGateway};
use carlot_domains::uploads::ImageStore;
use carlot_server::{build_router, AppState};

#[derive(Parser)]
#[command(name = "carlot-server", about = "Car dealership catalog, chatbot and checkout API")]
struct Cli {
    /// Path to config TOML file
    #[arg(long, default_value = "./config/carlot.toml")]
    config: PathBuf,
}

fn braintree_gateway(creds: &BraintreeCredentials) -> Result<Arc<dyn PaymentGateway>> {
    let environment: Environment = creds.environment.parse()?;
    let client = BraintreeClient::new(
        environment,
        creds.merchant_id.clone(),
        creds.public_key.clone(),
        creds.private_key.clone(),
    )?;
    Ok(Arc::new(BraintreeGateway::new(client)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting carlot-server");

    let cli = Cli::parse();
    let config_path = cli.config.canonicalize().with_context(|| {
        format!(
            "Config file not found: {}. Create one or specify --config <path>",
            cli.config.display()
        )
    })?;
    tracing::info!(config = %config_path.display(), "Loading config");
    let file_config = carlot_core::file_config::load_config(&config_path)?;

    // Secrets from env vars
    let config = AppConfig::from_env()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Migrations complete");

    let images = ImageStore::new(&file_config.uploads.dir, file_config.server.public_url());
    images.ensure_dir().await?;
    tracing::info!(dir = %images.dir().display(), "Upload directory ready");

    let gateway = config
        .braintree
        .as_ref()
        .map(braintree_gateway)
        .transpose()?;
    if gateway.is_none() {
        tracing::warn!("Braintree credentials not set, payment routes will answer 503");
    }

    let store = Arc::new(PgCatalogStore::new(pool));
    let state = Arc::new(AppState::new(store, images, gateway, &file_config));
    let app = build_router(state, &file_config);

    let addr = file_config.server.bind_addr();
    tracing::info!("carlot-server listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
