use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use validator::Validate;

use super::AppState;
use crate::core::Matcher;
use crate::errors::ApiError;
use crate::models::{MatchedJobsResponse, UserUpdate};
use crate::services::UserStore;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list))
            .route("/{username}", web::get().to(get))
            .route("/{username}", web::patch().to(update))
            .route("/{username}", web::delete().to(remove))
            .route("/{username}/jobs", web::get().to(matching_jobs))
            .route("/{username}/jobs/{id}", web::post().to(apply))
            .route("/{username}/tech/{id}", web::post().to(qualify)),
    );
}

/// GET /users  =>  { users }
///
/// Authorization required: admin
async fn list(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_admin(&req)?;

    let users = UserStore::new(state.db.as_ref()).find_all().await?;
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

/// GET /users/{username}  =>  { user } with `jobs` and `qualifications`
///
/// Authorization required: same user or admin
async fn get(
    state: web::Data<AppState>,
    req: HttpRequest,
    username: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_self_or_admin(&req, &username)?;

    let user = UserStore::new(state.db.as_ref()).get(&username).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

/// PATCH /users/{username}  =>  { user }
///
/// Authorization required: same user or admin; only admins may change
/// `isAdmin`.
async fn update(
    state: web::Data<AppState>,
    req: HttpRequest,
    username: web::Path<String>,
    body: web::Json<UserUpdate>,
) -> Result<HttpResponse, ApiError> {
    let caller = state.tokens.ensure_self_or_admin(&req, &username)?;
    body.validate()?;

    let data = body.into_inner();
    if data.is_admin.is_some() && !caller.is_admin {
        return Err(ApiError::Unauthorized);
    }

    let user = UserStore::new(state.db.as_ref()).update(&username, data).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

/// DELETE /users/{username}  =>  { deleted: username }
///
/// Authorization required: same user or admin
async fn remove(
    state: web::Data<AppState>,
    req: HttpRequest,
    username: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_self_or_admin(&req, &username)?;

    UserStore::new(state.db.as_ref()).remove(&username).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": username.into_inner() })))
}

/// POST /users/{username}/jobs/{id}  =>  201 { applied: id }
async fn apply(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, i32)>,
) -> Result<HttpResponse, ApiError> {
    let (username, job_id) = path.into_inner();
    state.tokens.ensure_self_or_admin(&req, &username)?;

    let application = UserStore::new(state.db.as_ref()).apply(&username, job_id).await?;
    Ok(HttpResponse::Created().json(json!({ "applied": application.job_id })))
}

/// POST /users/{username}/tech/{id}  =>  201 { qualified: id }
async fn qualify(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, i32)>,
) -> Result<HttpResponse, ApiError> {
    let (username, tech_id) = path.into_inner();
    state.tokens.ensure_self_or_admin(&req, &username)?;

    let qualification = UserStore::new(state.db.as_ref())
        .qualify(&username, tech_id)
        .await?;
    Ok(HttpResponse::Created().json(json!({ "qualified": qualification.tech_id })))
}

/// GET /users/{username}/jobs  =>  { jobs: [id, ...] }
///
/// Jobs whose technology requirements exactly equal the user's
/// qualifications.
async fn matching_jobs(
    state: web::Data<AppState>,
    req: HttpRequest,
    username: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.tokens.ensure_self_or_admin(&req, &username)?;

    let jobs = Matcher::new(state.db.as_ref()).find_matches(&username).await?;
    Ok(HttpResponse::Ok().json(MatchedJobsResponse { jobs }))
}
