/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation with unique credentials
/// - JWT token generation
/// - API client helpers
///
/// Integration tests need a running Postgres instance; set `DATABASE_URL`
/// and `JWT_SECRET` and run with `cargo test -- --ignored`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ladle_api::app::{build_router, AppState};
use ladle_api::config::Config;
use ladle_shared::auth::jwt::{create_token, Claims};
use ladle_shared::auth::password::hash_password;
use ladle_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};
use tower::Service as _;

static UNIQUE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Returns a string unique across the test process
pub fn unique(prefix: &str) -> String {
    let n = UNIQUE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}-{}-{}",
        prefix,
        std::process::id(),
        chrono::Utc::now().timestamp_micros() as u64 + n
    )
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database and one user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Migration path is relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = create_test_user(&db).await?;

        let claims = Claims::new(user.id);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value for the context user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Returns an authorization header for an arbitrary user
    pub fn auth_header_for(&self, user_id: i64) -> anyhow::Result<String> {
        let claims = Claims::new(user_id);
        let token = create_token(&claims, &self.config.jwt.secret)?;
        Ok(format!("Bearer {}", token))
    }

    /// Cleans up test data created by this context
    ///
    /// Recipes, marks and subscriptions cascade from the user rows.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE email LIKE 'test-%@example.com'")
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Creates a user with unique credentials and a known password
pub async fn create_test_user(db: &PgPool) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            email: format!("{}@example.com", unique("test")),
            username: unique("test-user"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: hash_password("integration-password")?,
        },
    )
    .await?;

    Ok(user)
}

/// Sends a JSON request and returns (status, parsed body)
pub async fn send_json(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> anyhow::Result<(StatusCode, serde_json::Value)> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };

    let response = ctx.app.clone().call(builder.body(body)?).await?;
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, json))
}

/// Inserts a tag directly, returning its id
pub async fn create_test_tag(db: &PgPool, slug_prefix: &str) -> anyhow::Result<i64> {
    let slug = unique(slug_prefix);
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO tags (name, color, slug) VALUES ($1, '#49B64E', $2) RETURNING id",
    )
    .bind(&slug)
    .bind(&slug)
    .fetch_one(db)
    .await?;

    Ok(id)
}

/// Inserts an ingredient directly, returning its id
pub async fn create_test_ingredient(db: &PgPool, unit: &str) -> anyhow::Result<i64> {
    create_named_ingredient(db, &unique("test-ingredient"), unit).await
}

/// Inserts an ingredient with an exact name, returning its id
pub async fn create_named_ingredient(
    db: &PgPool,
    name: &str,
    unit: &str,
) -> anyhow::Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(unit)
    .fetch_one(db)
    .await?;

    Ok(id)
}

/// Creates a recipe via the API and returns its id
pub async fn create_test_recipe(
    ctx: &TestContext,
    name: &str,
    tag_id: i64,
    ingredient_id: i64,
    amount: i32,
) -> anyhow::Result<i64> {
    let (status, body) = send_json(
        ctx,
        "POST",
        "/api/recipes",
        Some(&ctx.auth_header()),
        Some(serde_json::json!({
            "name": name,
            "text": "Test recipe",
            "cooking_time": 30,
            "tags": [tag_id],
            "ingredients": [{ "id": ingredient_id, "amount": amount }],
        })),
    )
    .await?;

    anyhow::ensure!(
        status == StatusCode::CREATED,
        "Expected 201 Created, got {}: {}",
        status,
        body
    );

    body["id"]
        .as_i64()
        .ok_or_else(|| anyhow::anyhow!("Response had no recipe id: {}", body))
}
