/// Tag endpoints
///
/// Read-only reference data.
///
/// # Endpoints
///
/// - `GET /api/tags` - Full list, unpaginated
/// - `GET /api/tags/:id` - Single tag

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use ladle_shared::models::tag::Tag;

/// Lists all tags
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    let tags = Tag::list(&state.db).await?;
    Ok(Json(tags))
}

/// Gets a single tag by id
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Tag>> {
    let tag = Tag::find_by_id(&state.db, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok(Json(tag))
}
