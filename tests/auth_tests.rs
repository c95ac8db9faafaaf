//! 登录流程集成测试

use axum::http::{Method, StatusCode};
use hrms_service::{auth::PasswordHasher, models::Role};
use serde_json::json;

mod common;
use common::TestApp;

const PASSWORD: &str = "TestPass123";

async fn seed_login(app: &TestApp, username: &str) {
    let hash = PasswordHasher::new().unwrap().hash(PASSWORD).unwrap();
    app.seed_user(username, &hash, Role::Hr, None).await;
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    seed_login(&app, "hr.user").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "hr.user", "password": PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 300);
    assert_eq!(body["user"]["username"], "hr.user");
    assert_eq!(body["user"]["role"], "HR");

    // 令牌可直接用于受保护接口
    let token = body["access_token"].as_str().unwrap();
    let (status, me) = app.get("/api/v1/auth/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["username"], "hr.user");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();
    seed_login(&app, "hr.user").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "hr.user", "password": "WrongPass123" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "ghost", "password": PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Authentication failed");
}

#[tokio::test]
async fn test_login_rejects_empty_credentials() {
    let app = TestApp::new();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "", "password": "" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_user_enforces_password_policy() {
    let app = TestApp::new();
    let admin = app.token_for(Role::Admin, None);

    let (status, body) = app
        .post(
            "/api/v1/users",
            &admin,
            json!({ "username": "weak.user", "password": "short", "role": "EMPLOYEE" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["message"].as_str().unwrap().contains("at least 8"));
    assert!(app.audit_entries().await.is_empty());
}

#[tokio::test]
async fn test_create_user_duplicate_username() {
    let app = TestApp::new();
    let admin = app.token_for(Role::Admin, None);
    let body = json!({ "username": "dup.user", "password": "Secret123", "role": "EMPLOYEE" });

    let (status, _) = app.post("/api/v1/users", &admin, body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.post("/api/v1/users", &admin, body).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = app.get("/api/v1/users", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["pagination"]["total"], 1);
}
