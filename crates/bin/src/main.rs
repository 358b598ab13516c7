//! cell-arena game server.

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("cell-arena v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = server::Config::load()?;
    info!("Loaded configuration");
    info!("  Rooms: {}", config.rooms.len());
    info!("  World: {}x{}", config.world.size, config.world.size);
    info!("  Listing port: {}", config.server.listing_port);

    // Start every room and the listing endpoint
    server::run(config).await?;

    Ok(())
}
