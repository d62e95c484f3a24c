use financial_steward::{backend::start_server, config::BackendConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = BackendConfig::from_env()?;

    info!("AI Financial Steward - Backend");
    info!("Port: {}", config.port);

    start_server(config.db_dir, &config.api_prefix, config.port).await?;

    Ok(())
}
