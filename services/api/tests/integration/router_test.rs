use axum::http::{HeaderValue, StatusCode, header};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::{Value, json};
use uuid::Uuid;

use beos_api_schema::hospitals;
use beos_domain::user::UserRole;
use beos_testing::auth::MockAuth;

use crate::helpers::{hospital_model, test_server};

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_healthz_with_request_id() {
    let server = test_server(DatabaseConnection::default());

    let response = server.get("/healthz").await;

    response.assert_status_ok();
    let id = response.headers().get("x-request-id").unwrap();
    assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let server = test_server(DatabaseConnection::default());

    server
        .get("/readyz")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_allow_configured_cors_origin() {
    let server = test_server(DatabaseConnection::default());

    let response = server
        .get("/healthz")
        .add_header(
            header::ORIGIN,
            HeaderValue::from_static("http://localhost:5173"),
        )
        .await;

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
}

// ── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_protected_route_without_token() {
    let server = test_server(DatabaseConnection::default());

    let response = server.get("/api/v1/donors").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["kind"], "UNAUTHORIZED");
}

#[tokio::test]
async fn should_reject_expired_token() {
    let server = test_server(DatabaseConnection::default());
    let auth = MockAuth::random(UserRole::Donor);

    server
        .get("/api/v1/auth/me")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", auth.expired_token())).unwrap(),
        )
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_refuse_admin_stats_for_non_admin() {
    let server = test_server(DatabaseConnection::default());
    let (name, value) = MockAuth::random(UserRole::Hospital).header();

    let response = server.get("/api/v1/admin/stats").add_header(name, value).await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["kind"], "ADMIN_REQUIRED");
}

// ── Validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_unknown_blood_type_in_search_path() {
    let server = test_server(DatabaseConnection::default());

    let response = server.get("/api/v1/blood-banks/search/Z%2B").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_REQUEST");
}

#[tokio::test]
async fn should_reject_non_numeric_id() {
    let server = test_server(DatabaseConnection::default());

    let response = server.get("/api/v1/hospitals/abc").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_REQUEST");
}

// ── Hospitals ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_hospital_publicly() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![hospital_model(2, Uuid::new_v4(), true)]])
        .into_connection();
    let server = test_server(db);

    let response = server.get("/api/v1/hospitals/2").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["id"], 2);
    assert_eq!(body["city"], "Lagos");
    assert_eq!(body["verified"], true);
}

#[tokio::test]
async fn should_return_404_for_missing_hospital() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<hospitals::Model>::new()])
        .into_connection();
    let server = test_server(db);

    let response = server.get("/api/v1/hospitals/7").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["kind"], "HOSPITAL_NOT_FOUND");
}

#[tokio::test]
async fn should_refuse_non_owner_update_before_reading_body() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![hospital_model(2, Uuid::new_v4(), false)]])
        .into_connection();
    let server = test_server(db);
    let (name, value) = MockAuth::random(UserRole::Hospital).header();

    let response = server
        .put("/api/v1/hospitals/2")
        .add_header(name, value)
        .json(&json!({ "latitude": "north" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["kind"], "NOT_OWNER");
}

#[tokio::test]
async fn should_reject_malformed_update_from_owner() {
    let owner = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![hospital_model(2, owner, false)]])
        .into_connection();
    let server = test_server(db);
    let (name, value) = MockAuth::new(owner, UserRole::Hospital).header();

    let response = server
        .put("/api/v1/hospitals/2")
        .add_header(name, value)
        .json(&json!({ "latitude": "north" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_REQUEST");
}

// ── Emergency ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_hospital_profile_to_file_request() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<hospitals::Model>::new()])
        .into_connection();
    let server = test_server(db);
    let (name, value) = MockAuth::random(UserRole::Donor).header();

    let response = server
        .post("/api/v1/emergency")
        .add_header(name, value)
        .json(&json!({ "blood_type": "O-", "units": 2 }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["kind"], "HOSPITAL_PROFILE_REQUIRED");
}

// ── Admin ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_verify_hospital_as_admin() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![hospital_model(3, Uuid::new_v4(), true)]])
        .into_connection();
    let server = test_server(db);
    let (name, value) = MockAuth::random(UserRole::Admin).header();

    let response = server
        .patch("/api/v1/admin/hospitals/3/verification")
        .add_header(name, value)
        .json(&json!({ "verified": true }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["id"], 3);
    assert_eq!(body["verified"], true);
}

#[tokio::test]
async fn should_not_touch_database_when_non_admin_deletes_user() {
    let server = test_server(DatabaseConnection::default());
    let (name, value) = MockAuth::random(UserRole::BloodBank).header();

    let response = server
        .delete(&format!("/api/v1/admin/users/{}", Uuid::new_v4()))
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["kind"], "ADMIN_REQUIRED");
}
