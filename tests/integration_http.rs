mod common;

use axum::http::StatusCode;
use common::TestApp;
use projex::testing::lazy_app_state;
use serde_json::json;
use sqlx::PgPool;

fn lazy_app() -> TestApp {
    TestApp::new(lazy_app_state().db)
}

#[tokio::test]
async fn test_protected_route_without_cookie_is_unauthorized() {
    let app = lazy_app();

    let res = app.request("GET", "/api/v1/projects", None, None).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.body,
        json!({
            "statusCode": 401,
            "message": "Unauthorized request",
            "errors": [],
            "success": false
        })
    );
}

#[tokio::test]
async fn test_garbage_access_token_without_refresh_is_unauthorized() {
    let app = lazy_app();

    let res = app
        .request(
            "GET",
            "/api/v1/users/profile",
            Some("accessToken=not-a-jwt"),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_errors_are_listed_per_field() {
    let app = lazy_app();

    let res = app
        .request(
            "POST",
            "/api/v1/users/register",
            None,
            Some(json!({
                "email": "not-an-email",
                "username": "AB",
                "password": "123",
                "fullname": "Ada"
            })),
        )
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["success"], false);
    let fields: Vec<String> = res.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|e| e.as_object().unwrap().keys().cloned())
        .collect();
    assert!(fields.contains(&"email".to_string()));
    assert!(fields.contains(&"username".to_string()));
    assert!(fields.contains(&"password".to_string()));
}

#[tokio::test]
async fn test_login_missing_field_is_unprocessable() {
    let app = lazy_app();

    let res = app
        .request(
            "POST",
            "/api/v1/users/login",
            None,
            Some(json!({ "email": "ada@example.com" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["success"], false);
    assert_eq!(
        res.body["errors"],
        json!([{ "password": "password is required" }])
    );
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let app = lazy_app();

    let res = app.request("GET", "/api/v1/nowhere", None, None).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Route not found");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = lazy_app();

    let res = app.request("GET", "/api-docs/openapi.json", None, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["info"]["title"], "ProjeX API");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_healthcheck_reports_database(pool: PgPool) {
    let app = TestApp::new(pool);

    let res = app.request("GET", "/api/v1/healthcheck", None, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"], json!({ "status": "ok", "database": "up" }));
}
