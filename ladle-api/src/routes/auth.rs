/// Token authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/token/login` - Exchange credentials for a bearer token
/// - `POST /api/auth/token/logout` - End the session (client drops the token)

use crate::{
    app::{AppState, Auth},
    error::{ApiError, ApiResult},
    routes::validation_error,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use ladle_shared::{
    auth::{jwt, password},
    models::user::User,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Token login request
#[derive(Debug, Deserialize, Validate)]
pub struct TokenLoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Token login response
#[derive(Debug, Serialize)]
pub struct TokenLoginResponse {
    /// Bearer token (24h)
    pub auth_token: String,
}

/// Token login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/token/login
/// Content-Type: application/json
///
/// {
///   "email": "cook@example.com",
///   "password": "..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
pub async fn token_login(
    State(state): State<AppState>,
    Json(req): Json<TokenLoginRequest>,
) -> ApiResult<Json<TokenLoginResponse>> {
    req.validate().map_err(validation_error)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let claims = jwt::Claims::new(user.id);
    let auth_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenLoginResponse { auth_token }))
}

/// Token logout endpoint
///
/// Tokens are stateless, so logout is a client-side operation; the
/// endpoint exists for surface compatibility and requires a valid token.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/token/logout
/// ```
pub async fn token_logout(Extension(auth): Extension<Auth>) -> ApiResult<StatusCode> {
    auth.require()?;
    Ok(StatusCode::NO_CONTENT)
}
