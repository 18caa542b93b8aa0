use std::sync::Arc;

use tourney_api::setup;
use tourney_core::Config;
use tourney_infra::CleanupService;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    tourney_infra::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;
    tracing::info!("Configuration loaded and validated successfully");

    // Create storage roots and build routes
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    let cleanup_handle = match CleanupService::from_config(&config) {
        Some(service) => Some(Arc::new(service).start()),
        None => {
            tracing::warn!("Scheduled temp file sweep disabled");
            None
        }
    };

    setup::server::start_server(&config, router).await?;

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }

    Ok(())
}
