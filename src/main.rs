use log::{error, info};
use std::sync::Arc;
use video_registry::configuration::config::Config;
use video_registry::error_handling::types::AppError;
use video_registry::storage::DatabaseStorage;
use video_registry::video_service::VideoService;
use video_registry::web_interface::WebServer;

async fn run(config: Config) -> Result<(), AppError> {
    let storage = DatabaseStorage::connect(&config.database).await?;
    info!("Storage ready");

    let service = VideoService::new(Arc::new(storage));
    let server = WebServer::new(service);
    server.start(config.server.socket_addr()).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .init();

    if dotenvy::dotenv().is_ok() {
        info!("Loaded environment from .env");
    }

    info!("Importing configuration");
    let config = match Config::from_args() {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to import configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Configuration imported successfully, database {}",
        config.database.redacted_url()
    );

    if let Err(e) = run(config).await {
        error!("{}, exiting...", e);
        std::process::exit(1);
    }
    info!("Video registry stopped");
}
