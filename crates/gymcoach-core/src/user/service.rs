//! User service layer.
//!
//! Emails are trimmed and lowercased before they reach the database, so
//! lookups and the uniqueness constraint are case-insensitive.

use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use gymcoach_db::models::User;
use gymcoach_db::queries::users::{self, NewUser, ProfileUpdate, ProfileUpdateOutcome};

use super::password::{hash_password, verify_against_dummy, verify_password};
use crate::error::CoachError;
use crate::token::{SessionConfig, issue_token};

/// Fields accepted when registering.
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub goal: Option<String>,
    pub restrictions: Option<String>,
    pub frequency: Option<i32>,
    pub image_url: Option<String>,
}

/// Profile fields written by an update. Absent text fields are stored empty.
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub email: String,
    /// New password; `None` or empty keeps the current one.
    pub password: Option<String>,
    pub name: Option<String>,
    pub goal: Option<String>,
    pub restrictions: Option<String>,
    pub frequency: Option<i32>,
    pub image_url: Option<String>,
}

/// A user together with a freshly issued session token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

fn normalize_email(raw: &str) -> Result<String, CoachError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(CoachError::validation("email is required"));
    }
    if !email.contains('@') {
        return Err(CoachError::validation(format!("invalid email address {raw:?}")));
    }
    Ok(email)
}

fn validate_frequency(frequency: Option<i32>) -> Result<i32, CoachError> {
    match frequency {
        Some(f) if f < 0 => Err(CoachError::validation(
            "frequency must be zero or positive",
        )),
        Some(f) => Ok(f),
        None => Ok(0),
    }
}

/// Register a new user and return it with a session token.
///
/// Fails with [`CoachError::Conflict`] when the email is already on file;
/// no row is written in that case.
pub async fn register(
    pool: &PgPool,
    sessions: &SessionConfig,
    input: RegisterInput,
) -> Result<AuthenticatedUser, CoachError> {
    let email = normalize_email(&input.email)?;
    if input.password.is_empty() {
        return Err(CoachError::validation("password is required"));
    }
    let frequency = validate_frequency(input.frequency)?;

    let password_hash = hash_password(&input.password).await?;

    let new_user = NewUser {
        email: &email,
        password_hash: &password_hash,
        name: input.name.as_deref().unwrap_or_default(),
        goal: input.goal.as_deref().unwrap_or_default(),
        restrictions: input.restrictions.as_deref().unwrap_or_default(),
        frequency,
        image_url: input.image_url.as_deref(),
    };

    let user = users::insert_user(pool, &new_user)
        .await?
        .ok_or_else(|| CoachError::Conflict(format!("email {email} is already registered")))?;

    info!(user_id = %user.id, "user registered");
    let token = issue_token(sessions, user.id);
    Ok(AuthenticatedUser { user, token })
}

/// Check credentials and return the user with a session token.
///
/// An unknown email and a wrong password both yield
/// [`CoachError::Unauthorized`] with the same message.
pub async fn login(
    pool: &PgPool,
    sessions: &SessionConfig,
    email: &str,
    password: &str,
) -> Result<AuthenticatedUser, CoachError> {
    let email = normalize_email(email)?;
    if password.is_empty() {
        return Err(CoachError::validation("password is required"));
    }

    let rejected = || CoachError::Unauthorized("invalid email or password".to_owned());

    let Some(user) = users::find_user_by_email(pool, &email).await? else {
        verify_against_dummy(password).await?;
        warn!("login attempt for unknown email");
        return Err(rejected());
    };

    if !verify_password(password, &user.password_hash).await? {
        warn!(user_id = %user.id, "login attempt with wrong password");
        return Err(rejected());
    }

    info!(user_id = %user.id, "user logged in");
    let token = issue_token(sessions, user.id);
    Ok(AuthenticatedUser { user, token })
}

/// Overwrite the profile of `user_id`.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    input: ProfileInput,
) -> Result<User, CoachError> {
    let email = normalize_email(&input.email)?;
    let frequency = validate_frequency(input.frequency)?;

    let password_hash = match input.password.as_deref() {
        Some(p) if !p.is_empty() => Some(hash_password(p).await?),
        _ => None,
    };

    let update = ProfileUpdate {
        email: &email,
        name: input.name.as_deref().unwrap_or_default(),
        goal: input.goal.as_deref().unwrap_or_default(),
        restrictions: input.restrictions.as_deref().unwrap_or_default(),
        frequency,
        image_url: input.image_url.as_deref(),
        password_hash: password_hash.as_deref(),
    };

    match users::update_profile(pool, user_id, &update).await? {
        ProfileUpdateOutcome::Updated(user) => {
            info!(user_id = %user.id, password_changed = password_hash.is_some(), "profile updated");
            Ok(user)
        }
        ProfileUpdateOutcome::NotFound => {
            Err(CoachError::NotFound(format!("user {user_id} not found")))
        }
        ProfileUpdateOutcome::EmailTaken => Err(CoachError::Conflict(format!(
            "email {email} is already registered"
        ))),
    }
}

/// Look up a user by ID. A missing user is `Ok(None)`.
pub async fn fetch_user(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, CoachError> {
    Ok(users::get_user(pool, user_id).await?)
}
