/// Application state and router builder
///
/// This module defines the shared application state and provides a
/// function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use ladle_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = ladle_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::error::ApiError;
use axum::{
    extract::Request,
    http::{header, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use ladle_shared::auth::jwt;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<crate::config::Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: crate::config::Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Identity resolved from the Authorization header
///
/// Read endpoints accept anonymous requests, so the identity is optional
/// and resolved once by [`auth_layer`]; handlers that mutate state call
/// [`Auth::require`].
#[derive(Debug, Clone, Copy)]
pub struct Auth(pub Option<i64>);

impl Auth {
    /// The authenticated user's id, if any
    pub fn user_id(&self) -> Option<i64> {
        self.0
    }

    /// Returns the user id or an Unauthorized error
    pub fn require(&self) -> Result<i64, ApiError> {
        self.0
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                           # Health check (public)
/// └── /api/
///     ├── /auth/token/                  # Token login/logout
///     ├── /users/                       # Registration, profiles, subscriptions
///     ├── /ingredients/                 # Reference data (read-only)
///     ├── /tags/                        # Reference data (read-only)
///     └── /recipes/                     # CRUD, favorite/cart, shopping list
/// ```
///
/// A bearer token, when present, is resolved once into the [`Auth`]
/// extension; read endpoints serve anonymous requests with
/// viewer-dependent fields set to false.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/token/login", post(routes::auth::token_login))
        .route("/token/logout", post(routes::auth::token_logout));

    let user_routes = Router::new()
        .route(
            "/",
            get(routes::users::list_users).post(routes::users::register),
        )
        .route("/me", get(routes::users::my_profile))
        .route("/set_password", post(routes::users::set_password))
        .route("/subscriptions", get(routes::users::subscriptions))
        .route("/:id", get(routes::users::get_user))
        .route(
            "/:id/subscribe",
            post(routes::users::subscribe).delete(routes::users::unsubscribe),
        );

    let ingredient_routes = Router::new()
        .route("/", get(routes::ingredients::list_ingredients))
        .route("/:id", get(routes::ingredients::get_ingredient));

    let tag_routes = Router::new()
        .route("/", get(routes::tags::list_tags))
        .route("/:id", get(routes::tags::get_tag));

    let recipe_routes = Router::new()
        .route(
            "/",
            get(routes::recipes::list_recipes).post(routes::recipes::create_recipe),
        )
        .route(
            "/download_shopping_cart",
            get(routes::recipes::download_shopping_cart),
        )
        .route(
            "/:id",
            get(routes::recipes::get_recipe)
                .patch(routes::recipes::update_recipe)
                .delete(routes::recipes::delete_recipe),
        )
        .route(
            "/:id/favorite",
            post(routes::recipes::add_favorite).delete(routes::recipes::remove_favorite),
        )
        .route(
            "/:id/shopping_cart",
            post(routes::recipes::add_to_cart).delete(routes::recipes::remove_from_cart),
        );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/ingredients", ingredient_routes)
        .nest("/tags", tag_routes)
        .nest("/recipes", recipe_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer-token middleware
///
/// Resolves the Authorization header into the [`Auth`] extension. Absent
/// header means anonymous; a present but invalid token is a 401 rather
/// than a silent downgrade to anonymous.
async fn auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth = match auth_header {
        None => Auth(None),
        Some(value) => {
            let token = value
                .strip_prefix("Bearer ")
                .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

            let claims = jwt::validate_token(token, state.jwt_secret())?;
            Auth(Some(claims.sub))
        }
    };

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_on_anonymous_is_unauthorized() {
        let auth = Auth(None);
        assert!(matches!(auth.require(), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_require_on_authenticated() {
        let auth = Auth(Some(7));
        assert_eq!(auth.require().unwrap(), 7);
    }
}
