use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use flight_proxy::config::{LoggingSettings, Settings};
use flight_proxy::routes::{self, AppState};
use flight_proxy::services::ProviderClient;
use flight_proxy::logging;
use std::sync::Arc;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    // Logging comes up before config errors are reported
    let logging_settings = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_else(|_| LoggingSettings::default());
    logging::init(&logging_settings);

    info!("Starting flight proxy...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    info!("Configuration loaded successfully");

    let provider = ProviderClient::from_settings(&settings).map_err(|e| {
        error!("Failed to create provider client: {}", e);
        std::io::Error::other(e)
    })?;

    info!(
        "Provider client initialized for {} (token cache: {})",
        settings.provider.base_url,
        if settings.token.cache_enabled { "on" } else { "off" }
    );

    let app_state = AppState {
        provider: Arc::new(provider),
        error_policy: settings.provider.error_policy,
    };

    info!("Upstream error policy: {:?}", app_state.error_policy);

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
