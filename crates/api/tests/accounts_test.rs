//! Authentication, the default-password gate and account self-service.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;

use common::TestApp;
use payroll_db::entities::sea_orm_active_enums::UserRole;

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["running_imports"], 0);
}

#[tokio::test]
async fn test_missing_and_invalid_tokens() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Request::builder().uri("/api/v1/statements").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "MISSING_TOKEN");

    let (status, body) = app
        .send(
            Request::builder()
                .uri("/api/v1/statements")
                .header(header::AUTHORIZATION, "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_default_password_blocks_until_changed() {
    let app = TestApp::new().await;
    let (_, token) = app.account("1001", UserRole::User, None, true).await;

    let (status, body) = app.get("/api/v1/statements", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "PASSWORD_CHANGE_REQUIRED");

    let (status, body) = app.get("/api/v1/accounts/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["must_change_password"], true);

    let (status, body) = app
        .json(
            "POST",
            "/api/v1/accounts/me/password",
            &token,
            json!({ "new_password": "0000", "confirm_password": "0000" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "DEFAULT_PASSWORD_REUSED");

    let (status, _) = app
        .json(
            "POST",
            "/api/v1/accounts/me/password",
            &token,
            json!({ "new_password": "s3cret", "confirm_password": "s3cret" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/v1/statements", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 0);
}

#[tokio::test]
async fn test_reset_password_rules() {
    let app = TestApp::new().await;
    let (_, hr_token) = app.account("hr", UserRole::Hr, None, false).await;
    let (admin_id, _) = app.account("admin", UserRole::Admin, None, false).await;
    let (employee_id, employee_token) = app.account("1001", UserRole::User, None, false).await;

    let (status, body) = app
        .call("POST", &format!("/api/v1/accounts/{admin_id}/reset-password"), &hr_token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "RESET_NOT_ALLOWED");

    let (status, body) = app
        .call("POST", &format!("/api/v1/accounts/{employee_id}/reset-password"), &employee_token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = app
        .call("POST", &format!("/api/v1/accounts/{employee_id}/reset-password"), &hr_token)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/v1/advances", &employee_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "PASSWORD_CHANGE_REQUIRED");
}
