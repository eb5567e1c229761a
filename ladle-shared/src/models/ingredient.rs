/// Ingredient reference data
///
/// Ingredients are immutable (name, measurement_unit) pairs, unique
/// together, listed alphabetically. They are loaded offline by the
/// `import_ingredients` binary and only read at runtime.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Ingredient reference entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    /// Unique ingredient id
    pub id: i64,

    /// Ingredient name (e.g., "Sea Salt")
    pub name: String,

    /// Measurement unit (e.g., "g", "ml", "pcs")
    pub measurement_unit: String,
}

impl Ingredient {
    /// Finds an ingredient by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    /// Lists ingredients, optionally filtered by a case-insensitive
    /// substring match on name
    ///
    /// `name=salt` matches "Salt", "Sea Salt" and "saltpeter". The query
    /// is a literal substring, so `%` and `_` match themselves. The
    /// listing is unpaginated and ordered alphabetically.
    pub async fn search(pool: &PgPool, name: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE $1::TEXT IS NULL OR name ILIKE '%' || $1 || '%'
            ORDER BY name
            "#,
        )
        .bind(name.map(escape_like))
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    /// Counts how many of the given ingredient ids exist
    ///
    /// Used by the recipe composer to reject references to unknown
    /// ingredients before opening the write transaction.
    pub async fn count_existing(pool: &PgPool, ids: &[i64]) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM ingredients WHERE id = ANY($1)")
                .bind(ids)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Inserts an ingredient, skipping rows that already exist
    ///
    /// Used by the offline importer; duplicates in the input file are not
    /// an error.
    ///
    /// # Returns
    ///
    /// True if the row was inserted, false if it already existed
    pub async fn import(
        pool: &PgPool,
        name: &str,
        measurement_unit: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT unique_ingredient_unit DO NOTHING
            "#,
        )
        .bind(name)
        .bind(measurement_unit)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Escapes LIKE pattern characters so the query matches them literally
///
/// Without this, `?name=%` would match every ingredient.
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
