//! Management endpoints end to end

mod common;

use admin_server::auth::verify_password;
use admin_server::db::repository::{permission, role, user};
use common::*;
use http::{Method, StatusCode};
use serde_json::{Value, json};
use shared::ErrorCode;

async fn root_token(t: &TestApp) -> (i64, String) {
    let root = user::find_by_email(&t.pool, ROOT_EMAIL).await.unwrap().unwrap();
    (root.id, token_for(&t.state, &root))
}

async fn role_id(t: &TestApp, name: &str) -> i64 {
    role::find_by_name(&t.pool, name).await.unwrap().unwrap().id
}

fn new_user(email: &str, role_id: i64) -> Value {
    json!({
        "first_name": "Nora",
        "last_name": "Quinn",
        "email": email,
        "password": PASSWORD,
        "role_id": role_id,
    })
}

#[tokio::test]
async fn only_super_admin_assigns_super_admin() {
    let t = setup().await;
    let super_admin = role_id(&t, "SuperAdmin").await;
    let admin = create_user(&t.pool, "Admin", "admin@example.com").await;
    let admin_token = token_for(&t.state, &admin);

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/users",
        Some(&admin_token),
        Some(new_user("nora@example.com", super_admin)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], ErrorCode::SuperAdminRequired as u16);

    let (_, root) = root_token(&t).await;
    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/users",
        Some(&root),
        Some(new_user("nora@example.com", super_admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "nora@example.com");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn users_cannot_toggle_or_delete_themselves() {
    let t = setup().await;
    let (root_id, root) = root_token(&t).await;

    let uri = format!("/api/users/{root_id}/toggle");
    let (status, body) = send(&t.app, Method::PATCH, &uri, Some(&root), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], ErrorCode::UserCannotModifySelf as u16);

    let uri = format!("/api/users/{root_id}");
    let (status, _) = send(&t.app, Method::DELETE, &uri, Some(&root), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn manager_edits_but_cannot_delete() {
    let t = setup().await;
    let manager = create_user(&t.pool, "Manager", "manager@example.com").await;
    let guest = create_user(&t.pool, "Guest", "guest@example.com").await;
    let token = token_for(&t.state, &manager);

    let uri = format!("/api/users/{}/toggle", guest.id);
    let (status, body) = send(&t.app, Method::PATCH, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_active"], false);

    let uri = format!("/api/users/{}", guest.id);
    let (status, _) = send(&t.app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn change_password_checks_the_old_one() {
    let t = setup().await;
    let (_, root) = root_token(&t).await;
    let target = create_user(&t.pool, "User", "user@example.com").await;
    let uri = format!("/api/users/{}/change-password", target.id);

    let (status, body) = send(
        &t.app,
        Method::POST,
        &uri,
        Some(&root),
        Some(json!({ "old_password": "Wr0ng!pass", "new_password": "N3w!password" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], ErrorCode::UserPasswordIncorrect as u16);

    let (status, _) = send(
        &t.app,
        Method::POST,
        &uri,
        Some(&root),
        Some(json!({ "old_password": PASSWORD, "new_password": "N3w!password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_resets_password_without_the_old_one() {
    let t = setup().await;
    let (_, root) = root_token(&t).await;
    let target = create_user(&t.pool, "User", "user@example.com").await;
    let uri = format!("/api/users/{}", target.id);
    let changes = |reset: &str| {
        json!({
            "first_name": "Test",
            "email": "user@example.com",
            "role_id": target.role_id,
            "reset_password": reset,
        })
    };

    let (status, body) = send(&t.app, Method::PUT, &uri, Some(&root), Some(changes("weak"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["errors"]["reset_password"].is_array());

    let (status, _) =
        send(&t.app, Method::PUT, &uri, Some(&root), Some(changes("N3w!password"))).await;
    assert_eq!(status, StatusCode::OK);
    let stored = user::find_by_id(&t.pool, target.id).await.unwrap().unwrap();
    assert!(verify_password("N3w!password", &stored.password_hash).unwrap());

    // Blank keeps the current password
    let (status, _) = send(&t.app, Method::PUT, &uri, Some(&root), Some(changes(" "))).await;
    assert_eq!(status, StatusCode::OK);
    let stored = user::find_by_id(&t.pool, target.id).await.unwrap().unwrap();
    assert!(verify_password("N3w!password", &stored.password_hash).unwrap());
}

#[tokio::test]
async fn email_availability_needs_user_list_rights() {
    let t = setup().await;
    let (_, root) = root_token(&t).await;
    let check = |email: &str| format!("/api/users/is-email-available?email={email}");

    let (status, body) = get(&t.app, &check("ROOT@example.com"), &root).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["available"], false);

    let (_, body) = get(&t.app, &check("new@example.com"), &root).await;
    assert_eq!(body["data"]["available"], true);

    let (status, body) = get(&t.app, &check(""), &root).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::ValidationFailed as u16);

    let guest = create_user(&t.pool, "Guest", "guest@example.com").await;
    let token = token_for(&t.state, &guest);
    let (status, _) = get(&t.app, &check("a@b.io"), &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_list_reflects_writes() {
    let t = setup().await;
    let (_, root) = root_token(&t).await;

    let (status, body) = get(&t.app, "/api/roles?page_size=50", &root).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 5);

    let faq: i64 = sqlx::query_scalar("SELECT id FROM permission WHERE name = 'FAQ.List'")
        .fetch_one(&t.pool)
        .await
        .unwrap();
    let (status, created) = send(
        &t.app,
        Method::POST,
        "/api/roles",
        Some(&root),
        Some(json!({ "name": "Editor", "description": "Edits FAQ", "permission_ids": [faq] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["data"]["permissions"].as_array().unwrap().len(), 1);

    let (_, body) = get(&t.app, "/api/roles?page_size=50", &root).await;
    assert_eq!(body["data"]["total"], 6);

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/roles",
        Some(&root),
        Some(json!({ "name": "Editor", "description": "Again", "permission_ids": [faq] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], ErrorCode::RoleNameExists as u16);
}

#[tokio::test]
async fn role_update_keeps_at_least_one_grant() {
    let t = setup().await;
    let (_, root) = root_token(&t).await;
    let guest = role_id(&t, "Guest").await;
    let uri = format!("/api/roles/{guest}");

    let (status, body) = send(
        &t.app,
        Method::PUT,
        &uri,
        Some(&root),
        Some(json!({ "name": "Guest", "description": "Read only", "permission_ids": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::RolePermissionsRequired as u16);

    let granted = permission::find_by_role(&t.pool, guest).await.unwrap();
    let names: Vec<&str> = granted.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["FAQ.List"]);
}

#[tokio::test]
async fn protected_roles_cannot_be_deleted() {
    let t = setup().await;
    let (_, root) = root_token(&t).await;
    let admin = role_id(&t, "Admin").await;

    let uri = format!("/api/roles/{admin}");
    let (status, body) = send(&t.app, Method::DELETE, &uri, Some(&root), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], ErrorCode::RoleIsProtected as u16);
}

#[tokio::test]
async fn cms_page_lifecycle() {
    let t = setup().await;
    let (_, root) = root_token(&t).await;

    let (status, created) = send(
        &t.app,
        Method::POST,
        "/api/cms",
        Some(&root),
        Some(json!({
            "key": "about-us",
            "title": "About Us",
            "meta_keyword": "about",
            "meta_title": "About",
            "meta_description": "About us",
            "content": "<p>Hello</p>",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["data"]["id"].as_i64().unwrap();

    let (_, listed) = get(&t.app, "/api/cms", &root).await;
    assert_eq!(listed["data"]["items"][0]["title"], "About Us");

    let uri = format!("/api/cms/{id}");
    let (status, _) = send(
        &t.app,
        Method::PUT,
        &uri,
        Some(&root),
        Some(json!({
            "title": "About Company",
            "meta_keyword": "about",
            "meta_title": "About",
            "meta_description": "About us",
            "content": "<p>Hello again</p>",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The cached page must not survive the update
    let (_, listed) = get(&t.app, "/api/cms", &root).await;
    assert_eq!(listed["data"]["items"][0]["title"], "About Company");

    let (status, _) = send(&t.app, Method::DELETE, &uri, Some(&root), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = get(&t.app, &uri, &root).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], ErrorCode::CmsNotFound as u16);
}

#[tokio::test]
async fn email_template_rejects_bad_payload() {
    let t = setup().await;
    let (_, root) = root_token(&t).await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/email-templates",
        Some(&root),
        Some(json!({
            "key": "has space",
            "title": "Welcome",
            "subject": "Welcome aboard",
            "body": "<p>Hi</p>",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::ValidationFailed as u16);
    assert!(body["details"]["errors"]["key"].is_array());

    let (status, _) = send(
        &t.app,
        Method::POST,
        "/api/email-templates",
        Some(&root),
        Some(json!({
            "key": "WELCOME",
            "title": "Welcome",
            "subject": "Welcome aboard",
            "body": "<p>Hi</p>",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bad_sort_field_is_rejected() {
    let t = setup().await;
    let (_, root) = root_token(&t).await;

    let (status, body) = get(&t.app, "/api/users?sort_by=password_hash", &root).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::ValidationFailed as u16);
}

#[tokio::test]
async fn audit_log_records_and_filters() {
    let t = setup().await;
    let (_, root) = root_token(&t).await;

    let (status, _) = get(&t.app, "/api/users/export", &root).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&t.app, "/api/audit-logs?type=Export", &root).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["activity"], "Exported users list");
    assert_eq!(body["data"]["items"][0]["user_name"], "Super");

    let (status, _) = get(&t.app, "/api/audit-logs?type=Purge", &root).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Admin is not granted the audit log
    let admin = create_user(&t.pool, "Admin", "admin@example.com").await;
    let token = token_for(&t.state, &admin);
    let (status, _) = get(&t.app, "/api/audit-logs", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
