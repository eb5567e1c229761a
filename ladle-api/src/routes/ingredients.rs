/// Ingredient endpoints
///
/// Read-only reference data with case-insensitive substring search.
///
/// # Endpoints
///
/// - `GET /api/ingredients?name=` - Substring search, unpaginated
/// - `GET /api/ingredients/:id` - Single ingredient

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use ladle_shared::models::ingredient::Ingredient;
use serde::Deserialize;

/// Ingredient listing query parameters
#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    /// Case-insensitive substring match on name
    pub name: Option<String>,
}

/// Lists ingredients, optionally filtered by name substring
///
/// `?name=salt` matches "Salt", "Sea Salt" and "saltpeter".
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let ingredients = Ingredient::search(&state.db, query.name.as_deref()).await?;
    Ok(Json(ingredients))
}

/// Gets a single ingredient by id
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Ingredient>> {
    let ingredient = Ingredient::find_by_id(&state.db, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok(Json(ingredient))
}
