// HTTP surface tests: routing, guards and status mapping

mod common;

use actix_web::{http::StatusCode, test, web, App};
use common::MockExecutor;
use jobly::routes::{configure_routes, AppState, Claims, TokenVerifier};
use jobly::services::{QueryExecutor, StorageError};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &str = "test-secret";

fn token(username: &str, is_admin: bool) -> String {
    let claims = Claims {
        username: username.to_string(),
        is_admin,
    };
    let jwt = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", jwt)
}

fn state(db: Arc<MockExecutor>) -> web::Data<AppState> {
    let db: Arc<dyn QueryExecutor> = db;
    web::Data::new(AppState {
        db,
        tokens: Arc::new(TokenVerifier::new(SECRET)),
    })
}

macro_rules! app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(state($db.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_reports_degraded_database() {
    let db = Arc::new(MockExecutor::new().fail(StorageError::Decode("down".into())));
    let app = app!(db);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "degraded");
}

#[actix_web::test]
async fn test_list_companies_with_filter() {
    let db = Arc::new(MockExecutor::new().reply(vec![json!({
        "handle": "c1",
        "name": "C1",
        "numEmployees": 1,
        "description": "Desc1",
        "logoUrl": "http://c1.img"
    })]));
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri("/companies?name=c1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["companies"][0]["handle"], "c1");
    assert!(db.calls()[0].0.contains("name ILIKE $1"));
}

#[actix_web::test]
async fn test_unknown_filter_is_bad_request() {
    let db = Arc::new(MockExecutor::new());
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri("/companies?color=blue")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(db.calls().is_empty());
}

#[actix_web::test]
async fn test_create_company_requires_admin() {
    let db = Arc::new(MockExecutor::new());
    let app = app!(db);
    let payload = json!({"handle": "new", "name": "New", "description": "D"});

    let anon = test::TestRequest::post()
        .uri("/companies")
        .set_json(&payload)
        .to_request();
    assert_eq!(test::call_service(&app, anon).await.status(), StatusCode::UNAUTHORIZED);

    let user = test::TestRequest::post()
        .uri("/companies")
        .insert_header(("Authorization", token("u1", false)))
        .set_json(&payload)
        .to_request();
    assert_eq!(test::call_service(&app, user).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_company_as_admin() {
    let db = Arc::new(MockExecutor::new().reply(vec![json!({
        "handle": "new",
        "name": "New",
        "numEmployees": 10,
        "description": "D",
        "logoUrl": null
    })]));
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/companies")
        .insert_header(("Authorization", token("admin", true)))
        .set_json(json!({"handle": "new", "name": "New", "numEmployees": 10, "description": "D"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["company"]["numEmployees"], 10);
}

#[actix_web::test]
async fn test_unknown_body_field_is_bad_request() {
    let db = Arc::new(MockExecutor::new());
    let app = app!(db);

    let req = test::TestRequest::patch()
        .uri("/companies/c1")
        .insert_header(("Authorization", token("admin", true)))
        .set_json(json!({"handle": "renamed"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(db.calls().is_empty());
}

#[actix_web::test]
async fn test_duplicate_company_is_bad_request() {
    let db = Arc::new(MockExecutor::new().fail(StorageError::UniqueViolation("companies_pkey".into())));
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/companies")
        .insert_header(("Authorization", token("admin", true)))
        .set_json(json!({"handle": "c1", "name": "C1", "description": "D"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Duplicate company: c1");
}

#[actix_web::test]
async fn test_missing_job_is_not_found() {
    let db = Arc::new(MockExecutor::new().empty());
    let app = app!(db);

    let req = test::TestRequest::get().uri("/jobs/999").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}

#[actix_web::test]
async fn test_job_equity_serialized_as_string() {
    let db = Arc::new(
        MockExecutor::new()
            .reply(vec![json!({
                "id": 1, "title": "J1", "salary": 100, "equity": "0.10", "companyHandle": "c1"
            })])
            .empty(),
    );
    let app = app!(db);

    let req = test::TestRequest::get().uri("/jobs/1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["job"]["equity"], "0.10");
    assert_eq!(body["job"]["technologies"], json!([]));
}

#[actix_web::test]
async fn test_empty_job_update_is_bad_request() {
    let db = Arc::new(MockExecutor::new());
    let app = app!(db);

    let req = test::TestRequest::patch()
        .uri("/jobs/1")
        .insert_header(("Authorization", token("admin", true)))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_matching_jobs_route() {
    let db = Arc::new(
        MockExecutor::new()
            .reply(vec![json!({"username": "u1"})])
            .reply(vec![json!({"techId": 1})])
            .reply(vec![json!({"jobId": 10})])
            .reply(vec![json!({"techId": 1})]),
    );
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri("/users/u1/jobs")
        .insert_header(("Authorization", token("u1", false)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({"jobs": [10]}));
}

#[actix_web::test]
async fn test_matching_jobs_for_someone_else() {
    let db = Arc::new(MockExecutor::new());
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri("/users/u1/jobs")
        .insert_header(("Authorization", token("u2", false)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(db.calls().is_empty());
}

#[actix_web::test]
async fn test_non_admin_cannot_grant_admin() {
    let db = Arc::new(MockExecutor::new());
    let app = app!(db);

    let req = test::TestRequest::patch()
        .uri("/users/u1")
        .insert_header(("Authorization", token("u1", false)))
        .set_json(json!({"isAdmin": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_password_cannot_be_patched() {
    let db = Arc::new(MockExecutor::new());
    let app = app!(db);

    let req = test::TestRequest::patch()
        .uri("/users/u1")
        .insert_header(("Authorization", token("u1", false)))
        .set_json(json!({"passwordHash": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_apply_to_job() {
    let db = Arc::new(MockExecutor::new().reply(vec![json!({"username": "u1", "jobId": 7})]));
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/users/u1/jobs/7")
        .insert_header(("Authorization", token("u1", false)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"applied": 7}));
}

#[actix_web::test]
async fn test_storage_failure_hides_details() {
    let db = Arc::new(MockExecutor::new().fail(StorageError::Decode("column secret".into())));
    let app = app!(db);

    let req = test::TestRequest::get().uri("/technologies").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(!body["message"].as_str().unwrap().contains("secret"));
}

#[actix_web::test]
async fn test_uppercase_company_handle_is_bad_request() {
    let db = Arc::new(MockExecutor::new());
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/companies")
        .insert_header(("Authorization", token("admin", true)))
        .set_json(json!({"handle": "UPPER", "name": "Upper", "description": "D"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(db.calls().is_empty());
}

#[actix_web::test]
async fn test_company_rename_collision_is_bad_request() {
    let db = Arc::new(MockExecutor::new().fail(StorageError::UniqueViolation("companies_name_key".into())));
    let app = app!(db);

    let req = test::TestRequest::patch()
        .uri("/companies/c2")
        .insert_header(("Authorization", token("admin", true)))
        .set_json(json!({"name": "C1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "duplicate");
}
