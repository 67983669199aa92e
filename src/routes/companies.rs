use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use std::collections::BTreeMap;
use validator::Validate;

use super::{criteria, AppState};
use crate::errors::ApiError;
use crate::models::{CompanyUpdate, NewCompany};
use crate::services::CompanyStore;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/companies")
            .route("", web::post().to(create))
            .route("", web::get().to(list))
            .route("/{handle}", web::get().to(get))
            .route("/{handle}", web::patch().to(update))
            .route("/{handle}", web::delete().to(remove)),
    );
}

/// POST /companies  =>  201 { company }
///
/// Authorization required: admin
async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NewCompany>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_admin(&req)?;
    body.validate()?;

    let company = CompanyStore::new(state.db.as_ref())
        .create(body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({ "company": company })))
}

/// GET /companies?minEmployees=&maxEmployees=&name=  =>  { companies }
async fn list(
    state: web::Data<AppState>,
    query: web::Query<BTreeMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let filter = criteria(query.into_inner());
    let companies = CompanyStore::new(state.db.as_ref())
        .find_all(Some(&filter))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "companies": companies })))
}

/// GET /companies/{handle}  =>  { company } including its jobs
async fn get(
    state: web::Data<AppState>,
    handle: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let company = CompanyStore::new(state.db.as_ref()).get(&handle).await?;
    Ok(HttpResponse::Ok().json(json!({ "company": company })))
}

/// PATCH /companies/{handle}  =>  { company }
///
/// Authorization required: admin
async fn update(
    state: web::Data<AppState>,
    req: HttpRequest,
    handle: web::Path<String>,
    body: web::Json<CompanyUpdate>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_admin(&req)?;
    body.validate()?;

    let company = CompanyStore::new(state.db.as_ref())
        .update(&handle, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "company": company })))
}

/// DELETE /companies/{handle}  =>  { deleted: handle }
///
/// Authorization required: admin
async fn remove(
    state: web::Data<AppState>,
    req: HttpRequest,
    handle: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_admin(&req)?;

    CompanyStore::new(state.db.as_ref()).remove(&handle).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": handle.into_inner() })))
}
