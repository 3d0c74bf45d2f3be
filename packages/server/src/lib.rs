#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the air-quality map.
//!
//! Serves the JSON feeds behind the map (sensor markers, municipality
//! aggregates and polygons), the PDF report export, and the static
//! frontend. Every request reads a fresh snapshot of the observation
//! spreadsheet; no state is shared between requests beyond the HTTP client
//! and configuration.

mod handlers;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use air_quality_source::SourceConfig;

/// Shared application state.
pub struct AppState {
    /// HTTP client for the observation and asset sources.
    pub client: reqwest::Client,
    /// Source configuration.
    pub config: SourceConfig,
}

impl AppState {
    /// Creates the state for `config`.
    ///
    /// # Errors
    ///
    /// * If the HTTP client fails to build
    pub fn new(config: SourceConfig) -> Result<Self, air_quality_source::SourceError> {
        Ok(Self {
            client: air_quality_source::client(&config)?,
            config,
        })
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/municipalities", web::get().to(handlers::municipalities))
            .route("/map-data", web::get().to(handlers::map_data))
            .route("/aggregate", web::get().to(handlers::aggregate))
            .route("/polygons", web::get().to(handlers::polygons))
            .route("/export", web::post().to(handlers::export)),
    );
}

/// Starts the air-quality API server.
///
/// Loads the source configuration (see [`SourceConfig::load`]) and hands
/// it to [`serve`]. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration cannot be
/// loaded, or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let config = SourceConfig::load().map_err(std::io::Error::other)?;
    serve(config).await
}

/// Serves the API with `config`, bound to `BIND_ADDR`:`PORT` (default
/// `127.0.0.1:8080`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP client cannot be built,
/// or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn serve(config: SourceConfig) -> std::io::Result<()> {
    log::info!("Observation source: {}", config.url);

    let state = web::Data::new(AppState::new(config).map_err(std::io::Error::other)?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
