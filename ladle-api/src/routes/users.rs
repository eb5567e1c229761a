/// User endpoints
///
/// Registration, profile reads, password change and the subscription
/// surface.
///
/// # Endpoints
///
/// - `POST /api/users` - Register a new account
/// - `GET /api/users` - Paginated user listing
/// - `GET /api/users/me` - The authenticated user's own profile
/// - `POST /api/users/set_password` - Change password
/// - `GET /api/users/subscriptions` - Authors the requester follows
/// - `GET /api/users/:id` - Public profile
/// - `POST|DELETE /api/users/:id/subscribe` - Follow / unfollow an author

use crate::{
    app::{AppState, Auth},
    error::{ApiError, ApiResult},
    pagination::{Page, PageParams},
    routes::validation_error,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use ladle_shared::{
    auth::password,
    models::{
        recipe::{Recipe, RecipeMinified},
        relation,
        user::{CreateUser, User, UserProfile},
    },
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address, unique
    #[validate(
        email(message = "Invalid email format"),
        length(max = 254, message = "Email cannot be longer than 254 characters")
    )]
    pub email: String,

    /// Login name, unique; letters, digits and .@+-_ only
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        custom(function = validate_username)
    )]
    pub username: String,

    /// First name
    #[validate(length(min = 1, max = 150, message = "First name must be 1-150 characters"))]
    pub first_name: String,

    /// Last name
    #[validate(length(min = 1, max = 150, message = "Last name must be 1-150 characters"))]
    pub last_name: String,

    /// Plaintext password, hashed before storage
    pub password: String,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_alphanumeric() || ".@+-_".contains(c);
    if username.chars().all(allowed) {
        Ok(())
    } else {
        Err(ValidationError::new("username").with_message(
            "Username may contain only letters, digits and .@+-_ characters".into(),
        ))
    }
}

/// Registers a new user
///
/// The password is checked for strength and stored as an Argon2id hash.
/// Duplicate email or username surfaces as a 400 from the unique
/// constraint.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    req.validate().map_err(validation_error)?;
    password::validate_password_strength(&req.password)
        .map_err(|msg| ApiError::field("password", msg))?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "Registered user '{}'", user.username);

    let profile = UserProfile::load(&state.db, &user, None).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Lists users, paginated, ordered by username
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<UserProfile>>> {
    let users = User::list(&state.db, params.limit(), params.offset()).await?;
    let count = User::count(&state.db).await?;

    let results = UserProfile::load_many(&state.db, &users, auth.user_id()).await?;
    Ok(Json(Page { count, results }))
}

/// Returns the authenticated user's own profile
pub async fn my_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> ApiResult<Json<UserProfile>> {
    let user_id = auth.require()?;
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    let profile = UserProfile::load(&state.db, &user, auth.user_id()).await?;
    Ok(Json(profile))
}

/// Returns a user's public profile
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let profile = UserProfile::load(&state.db, &user, auth.user_id()).await?;
    Ok(Json(profile))
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    /// New plaintext password
    pub new_password: String,

    /// Current plaintext password, re-checked before the change
    pub current_password: String,
}

/// Changes the authenticated user's password
///
/// # Errors
///
/// - `400 Bad Request`: Wrong current password or weak new password
pub async fn set_password(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<SetPasswordRequest>,
) -> ApiResult<StatusCode> {
    let user_id = auth.require()?;
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    let current_ok = password::verify_password(&req.current_password, &user.password_hash)?;
    if !current_ok {
        return Err(ApiError::field(
            "current_password",
            "Current password is incorrect",
        ));
    }

    password::validate_password_strength(&req.new_password)
        .map_err(|msg| ApiError::field("new_password", msg))?;

    let new_hash = password::hash_password(&req.new_password)?;
    User::set_password_hash(&state.db, user_id, &new_hash).await?;

    tracing::info!(user_id, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters for the subscription surface
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    /// 1-based page number
    pub page: Option<i64>,

    /// Page size
    pub limit: Option<i64>,

    /// Cap on how many of each author's recipes to inline
    pub recipes_limit: Option<i64>,
}

impl SubscriptionQuery {
    fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// An author profile extended with their recipes
///
/// Returned by the subscription endpoints; `recipes` is newest-first and
/// truncated to `recipes_limit` when the query asks for it, while
/// `recipes_count` always covers the author's full catalog.
#[derive(Debug, Serialize)]
pub struct SubscriptionProfile {
    #[serde(flatten)]
    pub profile: UserProfile,

    /// The author's recipes, minified
    pub recipes: Vec<RecipeMinified>,

    /// Total recipes by this author, ignoring `recipes_limit`
    pub recipes_count: i64,
}

async fn subscription_profile(
    state: &AppState,
    author: &User,
    viewer: Option<i64>,
    recipes_limit: Option<i64>,
) -> Result<SubscriptionProfile, ApiError> {
    let profile = UserProfile::load(&state.db, author, viewer).await?;
    let recipes = Recipe::list_minified_by_author(&state.db, author.id, recipes_limit).await?;
    let recipes_count = Recipe::count_by_author(&state.db, author.id).await?;

    Ok(SubscriptionProfile {
        profile,
        recipes,
        recipes_count,
    })
}

/// Lists the authors the requester is subscribed to, with their recipes
pub async fn subscriptions(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<SubscriptionQuery>,
) -> ApiResult<Json<Page<SubscriptionProfile>>> {
    let user_id = auth.require()?;
    let params = query.page_params();

    let authors =
        User::list_subscribed_authors(&state.db, user_id, params.limit(), params.offset()).await?;
    let count = User::count_subscribed_authors(&state.db, user_id).await?;

    let mut results = Vec::with_capacity(authors.len());
    for author in &authors {
        results
            .push(subscription_profile(&state, author, Some(user_id), query.recipes_limit).await?);
    }

    Ok(Json(Page { count, results }))
}

/// Subscribes the requester to an author
///
/// # Errors
///
/// - `400 Bad Request`: Self-subscription or already subscribed
/// - `404 Not Found`: No such author
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
    Query(query): Query<SubscriptionQuery>,
) -> ApiResult<(StatusCode, Json<SubscriptionProfile>)> {
    let user_id = auth.require()?;
    let author = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    relation::subscribe(&state.db, user_id, author.id).await?;

    let profile =
        subscription_profile(&state, &author, Some(user_id), query.recipes_limit).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Unsubscribes the requester from an author
///
/// # Errors
///
/// - `400 Bad Request`: Not currently subscribed
/// - `404 Not Found`: No such author
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let user_id = auth.require()?;
    let author = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    relation::unsubscribe(&state.db, user_id, author.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
