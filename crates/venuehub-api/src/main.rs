use venuehub_api::setup;
use venuehub_core::Config;
use venuehub_infra::{init_telemetry, LogFormat};

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const DEFAULT_LOG_FILTER: &str =
    "info,venuehub_api=debug,venuehub_db=info,audit=info,tower_http=info,sqlx=warn";

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration (.env is read here when present)
    let config = Config::from_env()?;

    init_telemetry(DEFAULT_LOG_FILTER, LogFormat::parse(config.log_format()))?;

    // Initialize the application (database, services, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
