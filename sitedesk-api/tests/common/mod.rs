//! Shared helpers for the API integration tests
//!
//! - `fallback_app()` builds a router with no database
//! - `TestContext::new()` connects to `DATABASE_URL`, migrates, and creates a
//!   throwaway user; it returns `None` when no database is configured
//! - request/response helpers around `tower::ServiceExt::oneshot`

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use sitedesk_api::{
    app::{build_router, AppState},
    config::Config,
};
use sitedesk_shared::{
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    models::user::{CreateUser, User},
};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub fn fallback_app() -> Router {
    build_router(AppState::new(None, Config::for_tests()))
}

pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub user: User,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        Self::with_config(Config::for_tests()).await
    }

    pub async fn with_config(config: Config) -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;

        let db = create_pool(DatabaseConfig {
            url,
            max_connections: 5,
            ..Default::default()
        })
        .await
        .expect("test database should be reachable");
        run_migrations(&db).await.expect("migrations should apply");

        let user = create_user(&db, "Engineer").await;
        let app = build_router(AppState::new(Some(db.clone()), config));

        Some(Self { db, app, user })
    }

    /// Headers identifying as the context's user
    pub fn identity(&self) -> [(&'static str, String); 2] {
        identity_of(&self.user)
    }

    pub async fn cleanup(&self) {
        User::delete(&self.db, self.user.id).await.ok();
    }
}

pub async fn create_user(db: &PgPool, position: &str) -> User {
    User::create(
        db,
        CreateUser {
            username: format!("user-{}", Uuid::new_v4()),
            password: "secret-pw".to_string(),
            full_name: Some("Test User".to_string()),
            position: Some(position.to_string()),
            email: None,
            phone: None,
            employee_id: None,
        },
    )
    .await
    .expect("user should be created")
}

pub fn identity_of(user: &User) -> [(&'static str, String); 2] {
    [
        ("x-user-id", user.id.to_string()),
        ("x-username", user.username.clone()),
    ]
}

/// Sends one request and returns the status with the parsed JSON body
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, String)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, value.as_str());
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
