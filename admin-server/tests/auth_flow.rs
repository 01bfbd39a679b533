//! Login, current user and logout over HTTP

mod common;

use admin_server::auth::permissions::{self, SUPER_ADMIN};
use common::*;
use http::{Method, StatusCode};
use serde_json::json;
use shared::ErrorCode;

async fn login(t: &TestApp, email: &str, password: &str) -> (StatusCode, serde_json::Value) {
    send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

async fn audit_count(t: &TestApp, activity: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM audit_log WHERE activity = ?1")
        .bind(activity)
        .fetch_one(&t.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn login_me_logout() {
    let t = setup().await;

    // Email is matched case-insensitively after trimming
    let (status, body) = login(&t, "  ROOT@example.com ", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["user"]["roles"], json!([SUPER_ADMIN]));
    assert_eq!(
        body["data"]["user"]["permissions"].as_array().unwrap().len(),
        permissions::catalog().len()
    );
    assert_eq!(audit_count(&t, "Logged in").await, 1);

    let (status, body) = get(&t.app, "/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], ROOT_EMAIL);

    let (status, _) = send(&t.app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit_count(&t, "Logged out").await, 1);
}

#[tokio::test]
async fn bad_credentials_share_one_answer() {
    let t = setup().await;

    let (status, wrong_password) = login(&t, ROOT_EMAIL, "Wr0ng!pass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, unknown_email) = login(&t, "nobody@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(wrong_password["code"], ErrorCode::InvalidCredentials as u16);
    assert_eq!(wrong_password["message"], unknown_email["message"]);
    assert_eq!(audit_count(&t, "Failed login: unknown email").await, 1);
    assert_eq!(audit_count(&t, "Failed login: invalid password").await, 1);
}

#[tokio::test]
async fn empty_login_is_a_validation_error() {
    let t = setup().await;

    let (status, body) = login(&t, "", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::ValidationFailed as u16);
}

#[tokio::test]
async fn disabled_account_cannot_log_in() {
    let t = setup().await;
    let user = create_user(&t.pool, "User", "user@example.com").await;
    sqlx::query("UPDATE user SET is_active = 0 WHERE id = ?1")
        .bind(user.id)
        .execute(&t.pool)
        .await
        .unwrap();

    let (status, body) = login(&t, "user@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], ErrorCode::AccountDisabled as u16);
}

#[tokio::test]
async fn health_is_public() {
    let t = setup().await;

    let (status, body) = send(&t.app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn logout_refuses_deleted_or_disabled_accounts() {
    let t = setup().await;
    let disabled = create_user(&t.pool, "User", "disabled@example.com").await;
    let deleted = create_user(&t.pool, "User", "deleted@example.com").await;
    let disabled_token = token_for(&t.state, &disabled);
    let deleted_token = token_for(&t.state, &deleted);

    sqlx::query("UPDATE user SET is_active = 0 WHERE id = ?1")
        .bind(disabled.id)
        .execute(&t.pool)
        .await
        .unwrap();
    sqlx::query("DELETE FROM user WHERE id = ?1")
        .bind(deleted.id)
        .execute(&t.pool)
        .await
        .unwrap();

    let logout = "/api/auth/logout";
    let (status, body) = send(&t.app, Method::POST, logout, Some(&disabled_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], ErrorCode::AccountDisabled as u16);

    let (status, _) = send(&t.app, Method::POST, logout, Some(&deleted_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(audit_count(&t, "Logged out").await, 0);
}
