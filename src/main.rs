use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use buddy_match::config::Settings;
use buddy_match::core::{Matcher, TracingObserver};
use buddy_match::models::MatchingRules;
use buddy_match::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use buddy_match::services::{AppwriteClient, GeminiClient, TokenVerifier};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration comes first so logging can honour it
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting Buddy Match service...");

    let store = Arc::new(
        AppwriteClient::new(
            settings.store.endpoint.clone(),
            settings.store.api_key.clone(),
            settings.store.project_id.clone(),
            settings.store.database_id.clone(),
            settings.store.users_collection.clone(),
            settings.store.page_size,
        )
        .map_err(|e| io_error("Failed to create profile store client", e))?,
    );

    info!("Profile store client initialized (collection: {})", settings.store.users_collection);

    let model = Arc::new(
        GeminiClient::new(
            settings.model.endpoint.clone(),
            settings.model.api_key.clone(),
            settings.model.model.clone(),
            Duration::from_secs(settings.model.timeout_secs),
        )
        .map_err(|e| io_error("Failed to create model client", e))?,
    );

    info!("Model client initialized ({}, timeout {}s)", settings.model.model, settings.model.timeout_secs);

    let rules = MatchingRules::from(&settings.matching);
    let matcher = Matcher::new(rules, Arc::new(TracingObserver));

    info!("Matcher initialized with rules: {:?}", rules);

    let app_state = AppState {
        store,
        model,
        matcher,
    };
    let verifier = web::Data::new(
        TokenVerifier::new(&settings.auth.jwt_secret)
            .map_err(|e| io_error("Failed to configure authentication", e))?,
    );

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(verifier.clone())
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
