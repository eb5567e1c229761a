/// Database models for Ladle
///
/// This module contains all database models and their operations.
///
/// # Models
///
/// - `user`: User accounts, profiles and subscription listings
/// - `ingredient`: Ingredient reference data and name search
/// - `tag`: Recipe tags
/// - `recipe`: Recipes, their associations, filtering and projections
/// - `relation`: Favorite/cart marks and subscriptions (the toggler)
///
/// # Example
///
/// ```no_run
/// use ladle_shared::models::user::{CreateUser, User};
/// use ladle_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     CreateUser {
///         email: "cook@example.com".to_string(),
///         username: "cook".to_string(),
///         first_name: "Ada".to_string(),
///         last_name: "Lovelace".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod ingredient;
pub mod recipe;
pub mod relation;
pub mod tag;
pub mod user;
