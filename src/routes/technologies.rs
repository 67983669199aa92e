use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use validator::Validate;

use super::AppState;
use crate::errors::ApiError;
use crate::models::{NewTechnology, TechnologyUpdate};
use crate::services::TechnologyStore;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/technologies")
            .route("", web::post().to(create))
            .route("", web::get().to(list))
            .route("/{id}", web::get().to(get))
            .route("/{id}", web::patch().to(update))
            .route("/{id}", web::delete().to(remove)),
    );
}

/// Authorization required: admin
async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NewTechnology>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_admin(&req)?;
    body.validate()?;

    let technology = TechnologyStore::new(state.db.as_ref())
        .create(body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({ "technology": technology })))
}

async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let technologies = TechnologyStore::new(state.db.as_ref()).find_all().await?;
    Ok(HttpResponse::Ok().json(json!({ "technologies": technologies })))
}

async fn get(state: web::Data<AppState>, id: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let technology = TechnologyStore::new(state.db.as_ref())
        .get(id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "technology": technology })))
}

/// Authorization required: admin
async fn update(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<i32>,
    body: web::Json<TechnologyUpdate>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_admin(&req)?;
    body.validate()?;

    let technology = TechnologyStore::new(state.db.as_ref())
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "technology": technology })))
}

/// Authorization required: admin
async fn remove(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_admin(&req)?;

    let id = id.into_inner();
    TechnologyStore::new(state.db.as_ref()).remove(id).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": id })))
}
