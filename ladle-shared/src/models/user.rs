/// User model and database operations
///
/// Users own recipes and participate in subscriptions as subscriber or
/// author. Passwords are stored as Argon2id hashes, never in plaintext.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(254) NOT NULL UNIQUE,
///     username VARCHAR(150) NOT NULL UNIQUE,
///     first_name VARCHAR(150) NOT NULL,
///     last_name VARCHAR(150) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     is_staff BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id
    pub id: i64,

    /// Email address, unique across all users
    pub email: String,

    /// Login name, unique across all users
    pub username: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Administrator flag; staff may edit and delete any recipe
    pub is_staff: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Login name
    pub username: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Public profile projection of a user
///
/// `is_subscribed` is viewer-dependent: whether the requesting user is
/// subscribed to this user. Always false for anonymous viewers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email or username already exists (unique
    /// constraint violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, username, first_name, last_name, password_hash,
                      is_staff, created_at
            "#,
        )
        .bind(data.email)
        .bind(data.username)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, first_name, last_name, password_hash,
                   is_staff, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, first_name, last_name, password_hash,
                   is_staff, created_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces the stored password hash for a user
    ///
    /// # Returns
    ///
    /// True if the user existed and was updated
    pub async fn set_password_hash(
        pool: &PgPool,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists users with pagination, ordered by username
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, first_name, last_name, password_hash,
                   is_staff, created_at
            FROM users
            ORDER BY username
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Lists the authors the given user is subscribed to, paginated,
    /// ordered by username
    pub async fn list_subscribed_authors(
        pool: &PgPool,
        subscriber_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name,
                   u.password_hash, u.is_staff, u.created_at
            FROM users u
            JOIN subscriptions s ON s.author_id = u.id
            WHERE s.subscriber_id = $1
            ORDER BY u.username
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(subscriber_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts the authors the given user is subscribed to
    pub async fn count_subscribed_authors(
        pool: &PgPool,
        subscriber_id: i64,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = $1")
                .bind(subscriber_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

impl UserProfile {
    /// Builds a profile for a single user as seen by `viewer`
    pub async fn load(
        pool: &PgPool,
        user: &User,
        viewer: Option<i64>,
    ) -> Result<Self, sqlx::Error> {
        let is_subscribed = match viewer {
            Some(viewer_id) => {
                crate::models::relation::subscription_exists(pool, viewer_id, user.id).await?
            }
            None => false,
        };

        Ok(Self::project(user, is_subscribed))
    }

    /// Builds profiles for a batch of users with one subscription query
    pub async fn load_many(
        pool: &PgPool,
        users: &[User],
        viewer: Option<i64>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let subscribed: std::collections::HashSet<i64> = match viewer {
            Some(viewer_id) => {
                let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
                sqlx::query_scalar::<_, i64>(
                    "SELECT author_id FROM subscriptions
                     WHERE subscriber_id = $1 AND author_id = ANY($2)",
                )
                .bind(viewer_id)
                .bind(&ids)
                .fetch_all(pool)
                .await?
                .into_iter()
                .collect()
            }
            None => Default::default(),
        };

        Ok(users
            .iter()
            .map(|u| Self::project(u, subscribed.contains(&u.id)))
            .collect())
    }

    fn project(user: &User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}
