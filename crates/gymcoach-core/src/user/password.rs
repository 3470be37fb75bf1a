//! Salted password hashing.
//!
//! bcrypt is CPU-bound, so both operations run on the blocking pool.

use tokio::sync::OnceCell;

use crate::error::CoachError;

/// Work factor used for new hashes.
pub const HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Hash `password` with a fresh random salt.
pub async fn hash_password(password: &str) -> Result<String, CoachError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|e| CoachError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| CoachError::Internal(format!("failed to hash password: {e}")))
}

/// Check `password` against a stored bcrypt hash.
///
/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, CoachError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| CoachError::Internal(format!("password verification task failed: {e}")))?;

    match verified {
        Ok(ok) => Ok(ok),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash could not be parsed");
            Ok(false)
        }
    }
}

static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

/// Verify `password` against a throwaway hash and discard the result.
///
/// Login calls this for unknown emails so both rejection paths pay one
/// bcrypt verification.
pub async fn verify_against_dummy(password: &str) -> Result<(), CoachError> {
    let hash = DUMMY_HASH
        .get_or_try_init(|| hash_password("gymcoach-unknown-account"))
        .await?;
    verify_password(password, hash).await?;
    Ok(())
}
