/// Recipe tags
///
/// Tags are admin-seeded reference data: a display name, a hex color and a
/// URL slug, each globally unique. The API only reads them; recipes
/// reference them through the recipe_tags association.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Recipe tag
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    /// Unique tag id
    pub id: i64,

    /// Display name, globally unique
    pub name: String,

    /// Hex color string (e.g., "#49B64E"), globally unique
    pub color: String,

    /// URL slug, globally unique
    pub slug: String,
}

impl Tag {
    /// Finds a tag by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(tag)
    }

    /// Lists all tags, unpaginated
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags ORDER BY id")
            .fetch_all(pool)
            .await?;

        Ok(tags)
    }

    /// Counts how many of the given tag ids exist
    ///
    /// Used by the recipe composer to reject references to unknown tags
    /// before opening the write transaction.
    pub async fn count_existing(pool: &PgPool, ids: &[i64]) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
