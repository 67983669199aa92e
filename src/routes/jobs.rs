use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use std::collections::BTreeMap;
use validator::Validate;

use super::{criteria, AppState};
use crate::errors::ApiError;
use crate::models::{JobUpdate, NewJob};
use crate::services::JobStore;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/jobs")
            .route("", web::post().to(create))
            .route("", web::get().to(list))
            .route("/{id}", web::get().to(get))
            .route("/{id}", web::patch().to(update))
            .route("/{id}", web::delete().to(remove))
            .route("/{id}/tech/{tech_id}", web::post().to(require)),
    );
}

/// POST /jobs  =>  201 { job }
///
/// Authorization required: admin
async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NewJob>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_admin(&req)?;
    body.validate()?;

    let job = JobStore::new(state.db.as_ref()).create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "job": job })))
}

/// GET /jobs?title=&minSalary=&hasEquity=  =>  { jobs }
async fn list(
    state: web::Data<AppState>,
    query: web::Query<BTreeMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let filter = criteria(query.into_inner());
    let jobs = JobStore::new(state.db.as_ref()).find_all(Some(&filter)).await?;
    Ok(HttpResponse::Ok().json(json!({ "jobs": jobs })))
}

/// GET /jobs/{id}  =>  { job } including required technology ids
async fn get(state: web::Data<AppState>, id: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let job = JobStore::new(state.db.as_ref()).get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "job": job })))
}

/// PATCH /jobs/{id}  =>  { job }
///
/// Authorization required: admin
async fn update(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<i32>,
    body: web::Json<JobUpdate>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_admin(&req)?;
    body.validate()?;

    let job = JobStore::new(state.db.as_ref())
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "job": job })))
}

/// DELETE /jobs/{id}  =>  { deleted: id }
///
/// Authorization required: admin
async fn remove(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_admin(&req)?;

    let id = id.into_inner();
    JobStore::new(state.db.as_ref()).remove(id).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": id })))
}

/// POST /jobs/{id}/tech/{tech_id}  =>  201 { required: tech_id }
///
/// Authorization required: admin
async fn require(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_admin(&req)?;

    let (job_id, tech_id) = path.into_inner();
    let requirement = JobStore::new(state.db.as_ref()).require(job_id, tech_id).await?;
    Ok(HttpResponse::Created().json(json!({ "required": requirement.tech_id })))
}
