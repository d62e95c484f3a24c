use financial_steward::{a2a::start_server, config::AgentServerConfig};
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

    let config = AgentServerConfig::from_env()?;

    info!("AI Financial Steward - A2A Agent");
    info!("Port: {}", config.port);

    start_server(config).await?;

    Ok(())
}
