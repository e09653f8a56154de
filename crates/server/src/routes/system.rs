use actix_web::{get, web, HttpResponse};

use crate::state::AppState;
use crate::types::HealthResponse;

#[get("/")]
pub async fn home() -> HttpResponse {
    HttpResponse::Ok().json("home")
}

/// Liveness plus the active recognizer
#[get("/api/health")]
pub async fn health(state: web::Data<std::sync::Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        provider: state.recognizer.name().to_string(),
    })
}
