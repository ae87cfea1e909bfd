mod common;

use axum::http::StatusCode;
use common::{TEST_PASSWORD, TestApp, create_test_user};
use projex::projex_auth::generate_temporary_token;
use serde_json::json;
use sqlx::PgPool;

fn registration(email: &str, username: &str) -> serde_json::Value {
    json!({
        "email": email,
        "username": username,
        "password": "secret1",
        "fullname": "Ada Lovelace"
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_creates_unverified_user(pool: PgPool) {
    let app = TestApp::new(pool);

    let res = app
        .request(
            "POST",
            "/api/v1/users/register",
            None,
            Some(registration("Ada@Example.com", "ada")),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["statusCode"], 201);
    assert_eq!(res.body["data"]["email"], "ada@example.com");
    assert_eq!(res.body["data"]["isEmailVerified"], false);
    assert!(res.body["data"].get("password").is_none());

    let token_stored: bool = sqlx::query_scalar(
        "SELECT email_verification_token IS NOT NULL AND email_verification_expiry > NOW() FROM users WHERE username = 'ada'",
    )
    .fetch_one(app.db())
    .await
    .unwrap();
    assert!(token_stored);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_duplicate_username_conflicts(pool: PgPool) {
    let app = TestApp::new(pool);
    create_test_user(app.db(), "ada").await;

    let res = app
        .request(
            "POST",
            "/api/v1/users/register",
            None,
            Some(registration("other@example.com", "ada")),
        )
        .await;

    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["success"], false);
    assert_eq!(
        res.body["message"],
        "User with email or username already exists"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_duplicate_email_conflicts(pool: PgPool) {
    let app = TestApp::new(pool);
    let existing = create_test_user(app.db(), "ada").await;

    let res = app
        .request(
            "POST",
            "/api/v1/users/register",
            None,
            Some(registration(&existing.email.to_uppercase(), "grace")),
        )
        .await;

    assert_eq!(res.status, StatusCode::CONFLICT, "{}", res.body);
    assert_eq!(
        res.body["message"],
        "User with email or username already exists"
    );

    let graces: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = 'grace'")
        .fetch_one(app.db())
        .await
        .unwrap();
    assert_eq!(graces, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_rejects_blank_fullname(pool: PgPool) {
    let app = TestApp::new(pool);

    let res = app
        .request(
            "POST",
            "/api/v1/users/register",
            None,
            Some(json!({
                "email": "ada@example.com",
                "username": "ada",
                "password": "secret1",
                "fullname": "   "
            })),
        )
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY, "{}", res.body);
    assert_eq!(res.body["errors"][0]["fullName"], "Full name is required");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_verify_email_consumes_token(pool: PgPool) {
    let app = TestApp::new(pool);
    let user = create_test_user(app.db(), "grace").await;
    let token = generate_temporary_token();

    sqlx::query(
        "UPDATE users SET is_email_verified = FALSE, email_verification_token = $2, email_verification_expiry = $3 WHERE id = $1",
    )
    .bind(user.id)
    .bind(&token.hashed)
    .bind(token.expires_at)
    .execute(app.db())
    .await
    .unwrap();

    let uri = format!("/api/v1/users/verify/{}", token.unhashed);
    let res = app.request("GET", &uri, None, None).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["isEmailVerified"], true);

    let again = app.request("GET", &uri, None, None).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["message"], "Token is invalid or expired");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_sets_http_only_cookies(pool: PgPool) {
    let app = TestApp::new(pool);
    let user = create_test_user(app.db(), "linus").await;

    let res = app
        .request(
            "POST",
            "/api/v1/users/login",
            None,
            Some(json!({ "email": user.email, "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert!(res.body["data"]["accessToken"].is_string());
    assert_eq!(res.body["data"]["user"]["username"], "linus");

    let raw: Vec<String> = res
        .headers
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(raw.iter().any(|c| c.starts_with("accessToken=") && c.contains("HttpOnly")));
    assert!(raw.iter().any(|c| c.starts_with("refreshToken=") && c.contains("HttpOnly")));

    let stored: Option<String> = sqlx::query_scalar("SELECT refresh_token FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(app.db())
        .await
        .unwrap();
    assert_eq!(stored, res.cookie("refreshToken"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let app = TestApp::new(pool);
    let user = create_test_user(app.db(), "linus").await;

    let res = app
        .request(
            "POST",
            "/api/v1/users/login",
            None,
            Some(json!({ "email": user.email, "password": "not-it" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Incorrect email or password");
}

async fn login(app: &TestApp, email: &str) -> common::TestResponse {
    let res = app
        .request(
            "POST",
            "/api/v1/users/login",
            None,
            Some(json!({ "email": email, "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    res
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_rotates_and_rejects_reuse(pool: PgPool) {
    let app = TestApp::new(pool);
    let user = create_test_user(app.db(), "margaret").await;

    let old_refresh = login(&app, &user.email).await.cookie("refreshToken").unwrap();
    let cookie = format!("refreshToken={old_refresh}");

    let res = app
        .request("POST", "/api/v1/users/refresh-access-token", Some(&cookie), None)
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let new_refresh = res.body["data"]["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, old_refresh);
    assert_eq!(res.cookie("refreshToken").as_deref(), Some(new_refresh.as_str()));

    let reused = app
        .request("POST", "/api/v1/users/refresh-access-token", Some(&cookie), None)
        .await;
    assert_eq!(reused.status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_accepts_token_in_body(pool: PgPool) {
    let app = TestApp::new(pool);
    let user = create_test_user(app.db(), "barbara").await;
    let refresh = login(&app, &user.email).await.cookie("refreshToken").unwrap();

    let res = app
        .request(
            "POST",
            "/api/v1/users/refresh-access-token",
            None,
            Some(json!({ "refreshToken": refresh })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_expired_access_token_is_refreshed_silently(pool: PgPool) {
    let app = TestApp::new(pool);
    let user = create_test_user(app.db(), "edsger").await;
    let refresh = login(&app, &user.email).await.cookie("refreshToken").unwrap();

    // No access token at all: only the refresh cookie is presented.
    let cookie = format!("refreshToken={refresh}");
    let res = app
        .request("GET", "/api/v1/users/profile", Some(&cookie), None)
        .await;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["id"], user.id.to_string());

    let rotated = res.cookie("refreshToken").unwrap();
    assert_ne!(rotated, refresh);
    assert!(res.cookie("accessToken").is_some());

    let stored: Option<String> = sqlx::query_scalar("SELECT refresh_token FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(app.db())
        .await
        .unwrap();
    assert_eq!(stored, Some(rotated));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout_invalidates_refresh_token(pool: PgPool) {
    let app = TestApp::new(pool);
    let user = create_test_user(app.db(), "alan").await;
    let refresh = login(&app, &user.email).await.cookie("refreshToken").unwrap();

    let cookie = format!("{}; refreshToken={refresh}", app.auth_cookie(&user));
    let res = app
        .request("POST", "/api/v1/users/logout", Some(&cookie), None)
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.cookie("accessToken").as_deref(), Some(""));

    let retry = app
        .request(
            "POST",
            "/api/v1/users/refresh-access-token",
            Some(&format!("refreshToken={refresh}")),
            None,
        )
        .await;
    assert_eq!(retry.status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_forgot_password_does_not_reveal_accounts(pool: PgPool) {
    let app = TestApp::new(pool);

    let res = app
        .request(
            "POST",
            "/api/v1/users/forgot-password",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reset_password_with_token(pool: PgPool) {
    let app = TestApp::new(pool);
    let user = create_test_user(app.db(), "hedy").await;
    login(&app, &user.email).await;

    let res = app
        .request(
            "POST",
            "/api/v1/users/forgot-password",
            None,
            Some(json!({ "email": user.email })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    // The mailed token is unknown here, so plant one with a known value.
    let token = generate_temporary_token();
    sqlx::query("UPDATE users SET forgot_password_token = $2, forgot_password_expiry = $3 WHERE id = $1")
        .bind(user.id)
        .bind(&token.hashed)
        .bind(token.expires_at)
        .execute(app.db())
        .await
        .unwrap();

    let uri = format!("/api/v1/users/reset-password/{}", token.unhashed);
    let res = app
        .request("POST", &uri, None, Some(json!({ "newPassword": "brandnew1" })))
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    let (refresh, reset_token): (Option<String>, Option<String>) = sqlx::query_as(
        "SELECT refresh_token, forgot_password_token FROM users WHERE id = $1",
    )
    .bind(user.id)
    .fetch_one(app.db())
    .await
    .unwrap();
    assert!(refresh.is_none());
    assert!(reset_token.is_none());

    let login = app
        .request(
            "POST",
            "/api/v1/users/login",
            None,
            Some(json!({ "email": user.email, "password": "brandnew1" })),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_change_password_requires_old_password(pool: PgPool) {
    let app = TestApp::new(pool);
    let user = create_test_user(app.db(), "ken").await;

    let res = app
        .post(
            "/api/v1/users/change-password",
            &user,
            json!({ "oldPassword": "wrong-one", "newPassword": "another1" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Invalid old password");

    let res = app
        .post(
            "/api/v1/users/change-password",
            &user,
            json!({ "oldPassword": TEST_PASSWORD, "newPassword": "another1" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_change_password_ends_other_sessions(pool: PgPool) {
    let app = TestApp::new(pool);
    let user = create_test_user(app.db(), "alan").await;

    let refresh = login(&app, &user.email).await.cookie("refreshToken").unwrap();

    let res = app
        .post(
            "/api/v1/users/change-password",
            &user,
            json!({ "oldPassword": TEST_PASSWORD, "newPassword": "another1" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    let stale = app
        .request(
            "POST",
            "/api/v1/users/refresh-access-token",
            Some(&format!("refreshToken={refresh}")),
            None,
        )
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_resend_verification_conflicts_when_verified(pool: PgPool) {
    let app = TestApp::new(pool);
    let user = create_test_user(app.db(), "dennis").await;

    let res = app
        .post("/api/v1/users/resend-email-verification", &user, json!({}))
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}
