//! Database query functions for the `users` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

/// Fields required to create a user row.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub goal: &'a str,
    pub restrictions: &'a str,
    pub frequency: i32,
    pub image_url: Option<&'a str>,
}

/// Profile fields overwritten by an update.
#[derive(Debug, Clone)]
pub struct ProfileUpdate<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub goal: &'a str,
    pub restrictions: &'a str,
    pub frequency: i32,
    pub image_url: Option<&'a str>,
    /// Replacement bcrypt hash, or `None` to keep the current password.
    pub password_hash: Option<&'a str>,
}

/// Result of [`update_profile`].
#[derive(Debug)]
pub enum ProfileUpdateOutcome {
    Updated(User),
    NotFound,
    /// The new email belongs to another user.
    EmailTaken,
}

/// Insert a new user.
///
/// Returns `None` when the email is already registered; no row is written
/// in that case.
pub async fn insert_user(pool: &PgPool, new: &NewUser<'_>) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash, name, goal, restrictions, frequency, image_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (email) DO NOTHING \
         RETURNING *",
    )
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.name)
    .bind(new.goal)
    .bind(new.restrictions)
    .bind(new.frequency)
    .bind(new.image_url)
    .fetch_optional(pool)
    .await
    .context("failed to insert user")?;

    Ok(user)
}

/// Fetch a user by ID.
pub async fn get_user(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch user")?;

    Ok(user)
}

/// Fetch a user by email address (exact match).
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("failed to look up user by email")?;

    Ok(user)
}

/// Count rows holding the given email. Used to verify uniqueness in tests
/// and diagnostics.
pub async fn count_users_with_email(pool: &PgPool, email: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .context("failed to count users by email")?;

    Ok(count)
}

/// Overwrite every profile field of a user, optionally replacing the
/// password hash as well.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    update: &ProfileUpdate<'_>,
) -> Result<ProfileUpdateOutcome> {
    let result = sqlx::query_as::<_, User>(
        "UPDATE users \
         SET email = $2, name = $3, goal = $4, restrictions = $5, frequency = $6, \
             image_url = $7, password_hash = COALESCE($8, password_hash), updated_at = now() \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(id)
    .bind(update.email)
    .bind(update.name)
    .bind(update.goal)
    .bind(update.restrictions)
    .bind(update.frequency)
    .bind(update.image_url)
    .bind(update.password_hash)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some(user)) => Ok(ProfileUpdateOutcome::Updated(user)),
        Ok(None) => Ok(ProfileUpdateOutcome::NotFound),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Ok(ProfileUpdateOutcome::EmailTaken)
        }
        Err(e) => Err(anyhow::Error::new(e).context("failed to update user profile")),
    }
}
