use actix_web::{web, HttpResponse, Responder};

use super::AppState;
use crate::models::HealthResponse;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = match state.db.query("SELECT 1", &[]).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Health check query failed: {}", e);
            false
        }
    };

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
