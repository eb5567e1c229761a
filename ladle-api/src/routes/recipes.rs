/// Recipe endpoints
///
/// CRUD over recipes, favorite and shopping-cart toggling, and the
/// aggregated shopping-list download.
///
/// # Endpoints
///
/// - `GET /api/recipes` - Filtered, paginated listing
/// - `POST /api/recipes` - Create a recipe
/// - `GET /api/recipes/:id` - Read representation
/// - `PATCH /api/recipes/:id` - Partial update (author or staff)
/// - `DELETE /api/recipes/:id` - Delete (author or staff)
/// - `POST|DELETE /api/recipes/:id/favorite` - Toggle favorite
/// - `POST|DELETE /api/recipes/:id/shopping_cart` - Toggle cart
/// - `GET /api/recipes/download_shopping_cart` - Plain-text shopping list

use crate::{
    app::{AppState, Auth},
    error::{ApiError, ApiResult},
    pagination::{Page, PageParams},
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use ladle_shared::{
    models::{
        recipe::{NewRecipe, Recipe, RecipeDetail, RecipeFilter, RecipeUpdate},
        relation::{self, RecipeMark},
        user::User,
    },
    shopping,
};
use serde::{Deserialize, Serialize};

/// Recipe listing query parameters
///
/// `tags` is a comma-separated slug list with any-of semantics. The
/// boolean filters accept `1`/`true` and are ignored for anonymous
/// requests.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    /// 1-based page number
    pub page: Option<i64>,

    /// Page size
    pub limit: Option<i64>,

    /// Exact author id
    pub author: Option<i64>,

    /// Comma-separated tag slugs
    pub tags: Option<String>,

    /// Only recipes the requester has favorited
    pub is_favorited: Option<String>,

    /// Only recipes in the requester's shopping cart
    pub is_in_shopping_cart: Option<String>,
}

fn flag_set(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("1") | Some("true") | Some("True"))
}

impl RecipeListQuery {
    fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }

    /// Resolves the query into a filter as seen by `viewer`
    ///
    /// The viewer-dependent filters need an identity to filter against,
    /// so they are dropped for anonymous requests rather than matching
    /// nothing.
    fn filter(&self, viewer: Option<i64>) -> RecipeFilter {
        let tag_slugs = self.tags.as_deref().map(|tags| {
            tags.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        RecipeFilter {
            author: self.author,
            tag_slugs: tag_slugs.filter(|slugs| !slugs.is_empty()),
            favorited_by: viewer.filter(|_| flag_set(&self.is_favorited)),
            in_cart_of: viewer.filter(|_| flag_set(&self.is_in_shopping_cart)),
        }
    }
}

/// Lists recipes, filtered and paginated, newest first
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<RecipeListQuery>,
) -> ApiResult<Json<Page<RecipeDetail>>> {
    let params = query.page_params();
    let filter = query.filter(auth.user_id());

    let recipes = Recipe::list(&state.db, &filter, params.limit(), params.offset()).await?;
    let count = Recipe::count(&state.db, &filter).await?;

    let results = RecipeDetail::load_many(&state.db, &recipes, auth.user_id()).await?;
    Ok(Json(Page { count, results }))
}

/// Creates a recipe owned by the requester
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(data): Json<NewRecipe>,
) -> ApiResult<(StatusCode, Json<RecipeDetail>)> {
    let user_id = auth.require()?;

    let recipe = Recipe::create(&state.db, user_id, data).await?;
    tracing::info!(recipe_id = recipe.id, user_id, "Created recipe '{}'", recipe.name);

    let detail = RecipeDetail::load(&state.db, &recipe, auth.user_id()).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Returns a recipe's read representation
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RecipeDetail>> {
    let recipe = find_recipe(&state, id).await?;
    let detail = RecipeDetail::load(&state.db, &recipe, auth.user_id()).await?;
    Ok(Json(detail))
}

/// Applies a partial update to a recipe
///
/// # Errors
///
/// - `403 Forbidden`: Requester is neither the author nor staff
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
    Json(data): Json<RecipeUpdate>,
) -> ApiResult<Json<RecipeDetail>> {
    let user_id = auth.require()?;
    let recipe = find_recipe(&state, id).await?;
    check_can_modify(&state, &recipe, user_id).await?;

    let updated = Recipe::update(&state.db, recipe.id, data).await?;
    tracing::info!(recipe_id = updated.id, user_id, "Updated recipe");

    let detail = RecipeDetail::load(&state.db, &updated, auth.user_id()).await?;
    Ok(Json(detail))
}

/// Deletes a recipe
///
/// # Errors
///
/// - `403 Forbidden`: Requester is neither the author nor staff
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let user_id = auth.require()?;
    let recipe = find_recipe(&state, id).await?;
    check_can_modify(&state, &recipe, user_id).await?;

    Recipe::delete(&state.db, recipe.id).await?;
    tracing::info!(recipe_id = recipe.id, user_id, "Deleted recipe");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_recipe(state: &AppState, id: i64) -> Result<Recipe, ApiError> {
    Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))
}

/// Authors may modify their own recipes; staff may modify any
async fn check_can_modify(
    state: &AppState,
    recipe: &Recipe,
    user_id: i64,
) -> Result<(), ApiError> {
    if recipe.author_id == user_id {
        return Ok(());
    }

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    if user.is_staff {
        return Ok(());
    }

    Err(ApiError::Forbidden(
        "Only the author may modify this recipe".to_string(),
    ))
}

/// Message body returned by the mark toggles
#[derive(Debug, Serialize, Deserialize)]
pub struct MarkResponse {
    pub message: String,
}

async fn add_mark(
    state: &AppState,
    auth: Auth,
    recipe_id: i64,
    mark: RecipeMark,
) -> ApiResult<Json<MarkResponse>> {
    let user_id = auth.require()?;
    let recipe = find_recipe(state, recipe_id).await?;

    relation::add_mark(&state.db, mark, user_id, recipe.id).await?;

    Ok(Json(MarkResponse {
        message: format!("Recipe '{}' added to {}", recipe.name, mark.describe()),
    }))
}

async fn remove_mark(
    state: &AppState,
    auth: Auth,
    recipe_id: i64,
    mark: RecipeMark,
) -> ApiResult<Json<MarkResponse>> {
    let user_id = auth.require()?;
    let recipe = find_recipe(state, recipe_id).await?;

    relation::remove_mark(&state.db, mark, user_id, recipe.id).await?;

    Ok(Json(MarkResponse {
        message: format!("Recipe '{}' removed from {}", recipe.name, mark.describe()),
    }))
}

/// Adds a recipe to the requester's favorites
///
/// # Errors
///
/// - `400 Bad Request`: Already favorited
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MarkResponse>> {
    add_mark(&state, auth, id, RecipeMark::Favorite).await
}

/// Removes a recipe from the requester's favorites
///
/// # Errors
///
/// - `400 Bad Request`: Not favorited
pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MarkResponse>> {
    remove_mark(&state, auth, id, RecipeMark::Favorite).await
}

/// Adds a recipe to the requester's shopping cart
///
/// # Errors
///
/// - `400 Bad Request`: Already in the cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MarkResponse>> {
    add_mark(&state, auth, id, RecipeMark::ShoppingCart).await
}

/// Removes a recipe from the requester's shopping cart
///
/// # Errors
///
/// - `400 Bad Request`: Not in the cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MarkResponse>> {
    remove_mark(&state, auth, id, RecipeMark::ShoppingCart).await
}

/// Downloads the requester's aggregated shopping list
///
/// Plain-text attachment with one summed line per (ingredient, unit)
/// across every recipe in the cart. An empty cart still downloads, with
/// the header only.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> ApiResult<Response> {
    let user_id = auth.require()?;

    let items = shopping::shopping_list(&state.db, user_id).await?;
    let body = shopping::render_shopping_list(&items, chrono::Utc::now().date_naive());

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.txt\"",
            ),
        ],
        body,
    )
        .into_response();

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        assert!(flag_set(&Some("1".to_string())));
        assert!(flag_set(&Some("true".to_string())));
        assert!(!flag_set(&Some("0".to_string())));
        assert!(!flag_set(&None));
    }

    #[test]
    fn test_tags_split_and_trimmed() {
        let query = RecipeListQuery {
            tags: Some("breakfast, dinner,,".to_string()),
            ..Default::default()
        };
        let filter = query.filter(None);
        assert_eq!(
            filter.tag_slugs,
            Some(vec!["breakfast".to_string(), "dinner".to_string()])
        );
    }

    #[test]
    fn test_viewer_filters_dropped_for_anonymous() {
        let query = RecipeListQuery {
            is_favorited: Some("1".to_string()),
            is_in_shopping_cart: Some("true".to_string()),
            ..Default::default()
        };

        let filter = query.filter(None);
        assert_eq!(filter.favorited_by, None);
        assert_eq!(filter.in_cart_of, None);

        let filter = query.filter(Some(7));
        assert_eq!(filter.favorited_by, Some(7));
        assert_eq!(filter.in_cart_of, Some(7));
    }
}
