use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use jobly::config::Settings;
use jobly::routes::{self, AppState, TokenVerifier};
use jobly::services::PostgresClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Jobly service...");

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    info!("Configuration loaded successfully");

    // Initialize PostgreSQL client
    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        Some(db_max_conn),
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    if let Err(e) = postgres.health_check().await {
        error!("PostgreSQL health check failed: {}", e);
    }

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    // Build application state
    let app_state = AppState {
        db: Arc::new(postgres),
        tokens: Arc::new(TokenVerifier::new(&settings.auth.jwt_secret)),
    };

    // Configure HTTP server
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
