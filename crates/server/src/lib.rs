//! speechcheck HTTP server
//!
//! Actix-web 기반 REST API: audio upload → speech recognition → keyword count

pub mod error;
pub mod keywords;
pub mod routes;
pub mod state;
pub mod temp_audio;
pub mod types;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use speechcheck_common::{AppConfig, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use error::ApiError;
pub use keywords::KeywordCounter;
pub use state::AppState;

/// CORS policy: any origin unless an allow-list is configured
fn build_cors(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::permissive();
    }

    allowed_origins.iter().fold(
        Cors::default()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}

/// Build state from configuration and serve until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    config.validate()?;

    let bind_addr = config.server_bind_address();
    let allowed_origins = config.cors_allowed_origins.clone();
    let state = Arc::new(AppState::new(config)?);

    info!("Temporary audio directory: {}", state.temp_dir.display());
    info!(
        "Keyword phrases: {}",
        state.keywords.phrases().join(", ")
    );
    info!("Starting HTTP server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&allowed_origins))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(Arc::clone(&state)))
            .configure(routes::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
