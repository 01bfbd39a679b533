//! Shared harness for the HTTP integration tests
//!
//! Each test gets a fresh seeded in-memory database and an app whose gate
//! stores are wrapped in lookup counters.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use admin_server::auth::{IdentityStore, PermissionCatalog, hash_password};
use admin_server::core::build_app;
use admin_server::db::repository::{RepoError, role, user};
use admin_server::db::seed;
use admin_server::db::{DbService, SqliteStore};
use admin_server::{Config, ServerState};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use shared::models::{User, UserCreate};
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret-0123456789abcdef";
pub const PASSWORD: &str = "Str0ng!pass";
pub const ROOT_EMAIL: &str = "root@example.com";

/// SqliteStore that counts every identity and catalog lookup
pub struct CountingStore {
    inner: SqliteStore,
    pub identity_calls: AtomicUsize,
    pub catalog_calls: AtomicUsize,
}

impl CountingStore {
    pub fn lookups(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst) + self.catalog_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityStore for CountingStore {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_user_by_id(id).await
    }

    async fn get_roles_for_user(&self, user: &User) -> Result<Vec<String>, RepoError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_roles_for_user(user).await
    }
}

#[async_trait]
impl PermissionCatalog for CountingStore {
    async fn get_permissions_for_roles(
        &self,
        roles: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, RepoError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_permissions_for_roles(roles).await
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
    pub pool: SqlitePool,
    pub store: Arc<CountingStore>,
}

pub fn config() -> Config {
    let env: HashMap<&str, &str> = HashMap::from([
        ("JWT_SECRET", SECRET),
        ("SEED_ADMIN_EMAIL", ROOT_EMAIL),
        ("SEED_ADMIN_PASSWORD", PASSWORD),
    ]);
    Config::from_lookup(|name| env.get(name).map(|v| v.to_string())).unwrap()
}

pub async fn setup() -> TestApp {
    let config = config();
    let pool = DbService::memory().await.unwrap().pool;
    seed::run(&pool, config.bootstrap_admin.as_ref()).await.unwrap();

    let store = Arc::new(CountingStore {
        inner: SqliteStore::new(pool.clone()),
        identity_calls: AtomicUsize::new(0),
        catalog_calls: AtomicUsize::new(0),
    });
    let state = ServerState::with_stores(config, pool.clone(), store.clone(), store.clone());

    TestApp {
        app: build_app(state.clone()),
        state,
        pool,
        store,
    }
}

pub async fn create_user(pool: &SqlitePool, role_name: &str, email: &str) -> User {
    let role = role::find_by_name(pool, role_name).await.unwrap().unwrap();
    let payload = UserCreate {
        first_name: "Test".into(),
        last_name: Some(role_name.into()),
        email: email.into(),
        phone: None,
        password: PASSWORD.into(),
        role_id: role.id,
        is_active: true,
    };
    let hash = hash_password(PASSWORD).unwrap();
    user::create(pool, &payload, &hash, 0).await.unwrap()
}

/// Token for `user` with empty role and permission claims
pub fn token_for(state: &ServerState, user: &User) -> String {
    state.jwt_service.issue(user, &[], &[]).unwrap().token
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(token), None).await
}
