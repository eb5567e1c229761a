/// User-marks-a-thing relations: favorites, shopping cart, subscriptions
///
/// Favorite and shopping-cart rows have identical (user, recipe) shape and
/// identical add/remove semantics, so they share one code path keyed by
/// [`RecipeMark`]. Subscriptions relate a user to another user and add a
/// self-reference prohibition, but report failures through the same
/// [`RelationError`] so the conflict/not-found contract stays in one place.
///
/// Adds go through `INSERT ... ON CONFLICT DO NOTHING`: the unique
/// constraint is the race backstop, and a zero-row result is reported as
/// an explicit conflict rather than a silent no-op. Removes likewise
/// report an explicit error when nothing was deleted.

use sqlx::PgPool;

/// The two per-user recipe marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeMark {
    /// The user's favorites list
    Favorite,

    /// The user's shopping cart
    ShoppingCart,
}

impl RecipeMark {
    /// Backing table for this mark
    pub(crate) fn table(self) -> &'static str {
        match self {
            RecipeMark::Favorite => "favorites",
            RecipeMark::ShoppingCart => "shopping_cart",
        }
    }

    /// Human-readable name used in error messages
    pub fn describe(self) -> &'static str {
        match self {
            RecipeMark::Favorite => "favorites",
            RecipeMark::ShoppingCart => "shopping cart",
        }
    }
}

/// Error type for relation toggling
#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    /// Add attempted while the relation row already exists
    #[error("Relation already exists")]
    AlreadyExists,

    /// Remove attempted while no relation row exists
    #[error("Relation does not exist")]
    NotFound,

    /// Subscription where subscriber and author are the same user
    #[error("Self-subscription is not allowed")]
    SelfReference,

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Adds a recipe to the user's favorites or cart
///
/// # Errors
///
/// `RelationError::AlreadyExists` if the (user, recipe) pair is already
/// marked.
pub async fn add_mark(
    pool: &PgPool,
    mark: RecipeMark,
    user_id: i64,
    recipe_id: i64,
) -> Result<(), RelationError> {
    let query = format!(
        "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        mark.table()
    );

    let result = sqlx::query(&query)
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RelationError::AlreadyExists);
    }

    Ok(())
}

/// Removes a recipe from the user's favorites or cart
///
/// # Errors
///
/// `RelationError::NotFound` if the (user, recipe) pair is not marked.
pub async fn remove_mark(
    pool: &PgPool,
    mark: RecipeMark,
    user_id: i64,
    recipe_id: i64,
) -> Result<(), RelationError> {
    let query = format!(
        "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
        mark.table()
    );

    let result = sqlx::query(&query)
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RelationError::NotFound);
    }

    Ok(())
}

/// Checks whether a recipe is marked by the user
pub async fn mark_exists(
    pool: &PgPool,
    mark: RecipeMark,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool, sqlx::Error> {
    let query = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = $1 AND recipe_id = $2)",
        mark.table()
    );

    sqlx::query_scalar(&query)
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(pool)
        .await
}

/// Subscribes a user to an author
///
/// # Errors
///
/// - `RelationError::SelfReference` if subscriber and author are the same
///   user, regardless of prior state
/// - `RelationError::AlreadyExists` on a repeated subscribe
pub async fn subscribe(
    pool: &PgPool,
    subscriber_id: i64,
    author_id: i64,
) -> Result<(), RelationError> {
    if subscriber_id == author_id {
        return Err(RelationError::SelfReference);
    }

    let result = sqlx::query(
        "INSERT INTO subscriptions (subscriber_id, author_id)
         VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(subscriber_id)
    .bind(author_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RelationError::AlreadyExists);
    }

    Ok(())
}

/// Removes a subscription
///
/// # Errors
///
/// `RelationError::NotFound` if no active subscription exists.
pub async fn unsubscribe(
    pool: &PgPool,
    subscriber_id: i64,
    author_id: i64,
) -> Result<(), RelationError> {
    let result =
        sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND author_id = $2")
            .bind(subscriber_id)
            .bind(author_id)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(RelationError::NotFound);
    }

    Ok(())
}

/// Checks whether a subscription exists
pub async fn subscription_exists(
    pool: &PgPool,
    subscriber_id: i64,
    author_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM subscriptions WHERE subscriber_id = $1 AND author_id = $2)",
    )
    .bind(subscriber_id)
    .bind(author_id)
    .fetch_one(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_tables() {
        assert_eq!(RecipeMark::Favorite.table(), "favorites");
        assert_eq!(RecipeMark::ShoppingCart.table(), "shopping_cart");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            RelationError::AlreadyExists.to_string(),
            "Relation already exists"
        );
        assert_eq!(
            RelationError::SelfReference.to_string(),
            "Self-subscription is not allowed"
        );
    }

    // The conflict/not-found behavior against a live database is covered
    // by ladle-api/tests/integration_test.rs
}
