// Route exports
pub mod auth;
pub mod companies;
pub mod health;
pub mod jobs;
pub mod technologies;
pub mod users;

use actix_web::{error, web, HttpRequest};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::Criteria;
use crate::errors::ApiError;
use crate::services::QueryExecutor;
pub use auth::{Claims, TokenVerifier};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn QueryExecutor>,
    pub tokens: Arc<TokenVerifier>,
}

/// Register every route plus the JSON/query error handlers
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
        .configure(health::configure)
        .configure(companies::configure)
        .configure(jobs::configure)
        .configure(technologies::configure)
        .configure(users::configure);
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::Validation(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(format!("Invalid query: {}", err)).into()
}

/// Query-string parameters as filter criteria
pub(crate) fn criteria(query: BTreeMap<String, String>) -> Criteria {
    query
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}
