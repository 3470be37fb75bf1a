//! Signed session tokens identifying a user across requests.
//!
//! Tokens are HMAC-SHA256 based, scoped to a (user_id, issued_at) pair.
//! Format: `gc_st_<user_id>_<issued_at>_<hmac_hex>` where `issued_at` is a
//! Unix timestamp in seconds.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Token prefix used to identify gymcoach session tokens.
const TOKEN_PREFIX: &str = "gc_st_";

/// Environment variable holding the hex-encoded signing secret.
pub const TOKEN_SECRET_ENV: &str = "GYMCOACH_TOKEN_SECRET";

/// Default session lifetime: seven days.
pub const DEFAULT_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Errors that can occur during token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    #[error("invalid user ID in token: {0}")]
    InvalidUserId(String),

    #[error("invalid timestamp in token: {0}")]
    InvalidTimestamp(String),

    #[error("token HMAC verification failed")]
    HmacMismatch,

    #[error("token expired")]
    Expired,

    #[error("missing token secret")]
    MissingSecret,
}

/// Signing secret and lifetime for session tokens.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The HMAC secret key bytes.
    pub secret: Vec<u8>,
    /// Seconds a token stays valid after issue.
    pub ttl_secs: i64,
}

impl SessionConfig {
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }

    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Create a config from the `GYMCOACH_TOKEN_SECRET` environment variable.
    ///
    /// The value must be hex-encoded (as written by `gymcoach init`).
    pub fn from_env() -> Result<Self, TokenError> {
        let secret_hex = std::env::var(TOKEN_SECRET_ENV).map_err(|_| TokenError::MissingSecret)?;
        let secret = hex::decode(&secret_hex).map_err(|e| {
            TokenError::InvalidFormat(format!("{TOKEN_SECRET_ENV} is not valid hex: {e}"))
        })?;
        Ok(Self::new(secret))
    }
}

/// Claims extracted from a validated token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub issued_at: i64,
}

/// Generate a token for `user_id` issued at `issued_at` (Unix seconds).
pub fn generate_token(config: &SessionConfig, user_id: Uuid, issued_at: i64) -> String {
    let message = format!("{user_id}:{issued_at}");
    let mac = compute_hmac(&config.secret, message.as_bytes());
    let hmac_hex = hex::encode(mac);
    format!("{TOKEN_PREFIX}{user_id}_{issued_at}_{hmac_hex}")
}

/// Generate a token for `user_id` issued now.
pub fn issue_token(config: &SessionConfig, user_id: Uuid) -> String {
    generate_token(config, user_id, Utc::now().timestamp())
}

/// Validate a token against the signing secret and the clock value `now`.
///
/// Tokens issued in the future or older than `ttl_secs` are rejected.
pub fn validate_token(
    config: &SessionConfig,
    token: &str,
    now: i64,
) -> Result<SessionClaims, TokenError> {
    let rest = token.strip_prefix(TOKEN_PREFIX).ok_or_else(|| {
        TokenError::InvalidFormat(format!("token must start with '{TOKEN_PREFIX}'"))
    })?;

    // A UUID is 36 chars; parse it positionally since it contains dashes only.
    if rest.len() < 36 || !rest.is_char_boundary(36) {
        return Err(TokenError::InvalidFormat(
            "token too short to contain a valid UUID".to_string(),
        ));
    }
    let (user_id_str, after_user_id) = rest.split_at(36);
    let user_id =
        Uuid::parse_str(user_id_str).map_err(|e| TokenError::InvalidUserId(e.to_string()))?;

    let after_underscore = after_user_id.strip_prefix('_').ok_or_else(|| {
        TokenError::InvalidFormat("expected underscore after user_id".to_string())
    })?;

    let (issued_str, hmac_hex) = after_underscore.split_once('_').ok_or_else(|| {
        TokenError::InvalidFormat("expected underscore between timestamp and hmac".to_string())
    })?;

    let issued_at: i64 = issued_str
        .parse()
        .map_err(|e: std::num::ParseIntError| TokenError::InvalidTimestamp(e.to_string()))?;

    let provided_mac = hex::decode(hmac_hex)
        .map_err(|e| TokenError::InvalidFormat(format!("invalid hex in hmac: {e}")))?;

    let message = format!("{user_id}:{issued_at}");
    verify_hmac_constant_time(&config.secret, message.as_bytes(), &provided_mac)?;

    if issued_at > now || now - issued_at > config.ttl_secs {
        return Err(TokenError::Expired);
    }

    Ok(SessionClaims { user_id, issued_at })
}

/// Validate a token against the current time.
pub fn verify_token(config: &SessionConfig, token: &str) -> Result<SessionClaims, TokenError> {
    validate_token(config, token, Utc::now().timestamp())
}

fn compute_hmac(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Verify using the `hmac` crate's constant-time `verify_slice`.
fn verify_hmac_constant_time(
    key: &[u8],
    message: &[u8],
    expected_mac: &[u8],
) -> Result<(), TokenError> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    mac.verify_slice(expected_mac)
        .map_err(|_| TokenError::HmacMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_717_000_000;

    fn test_config() -> SessionConfig {
        SessionConfig::new(b"test-secret-key-for-gymcoach".to_vec())
    }

    fn user() -> Uuid {
        Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap()
    }

    #[test]
    fn generate_token_has_correct_format() {
        let token = generate_token(&test_config(), user(), NOW);

        assert!(token.starts_with("gc_st_"));
        assert!(token.contains(&user().to_string()));
        assert!(token.contains(&format!("_{NOW}_")));

        let hmac_hex = token.rsplit('_').next().unwrap();
        assert_eq!(hmac_hex.len(), 64, "HMAC-SHA256 hex should be 64 chars");
    }

    #[test]
    fn generate_and_validate_roundtrip() {
        let config = test_config();
        let token = generate_token(&config, user(), NOW);
        let claims = validate_token(&config, &token, NOW + 60).unwrap();

        assert_eq!(claims.user_id, user());
        assert_eq!(claims.issued_at, NOW);
    }

    #[test]
    fn issued_token_verifies_now() {
        let config = test_config();
        let id = Uuid::new_v4();
        let claims = verify_token(&config, &issue_token(&config, id)).unwrap();
        assert_eq!(claims.user_id, id);
    }

    #[test]
    fn reject_expired_token() {
        let config = test_config().with_ttl(3600);
        let token = generate_token(&config, user(), NOW);

        assert!(validate_token(&config, &token, NOW + 3600).is_ok());
        let result = validate_token(&config, &token, NOW + 3601);
        assert!(matches!(result.unwrap_err(), TokenError::Expired));
    }

    #[test]
    fn reject_token_from_the_future() {
        let config = test_config();
        let token = generate_token(&config, user(), NOW + 10);
        let result = validate_token(&config, &token, NOW);
        assert!(matches!(result.unwrap_err(), TokenError::Expired));
    }

    #[test]
    fn reject_tampered_hmac() {
        let config = test_config();
        let mut tampered = generate_token(&config, user(), NOW);
        let last_char = tampered.pop().unwrap();
        tampered.push(if last_char == 'a' { 'b' } else { 'a' });

        let result = validate_token(&config, &tampered, NOW);
        assert!(matches!(result.unwrap_err(), TokenError::HmacMismatch));
    }

    #[test]
    fn reject_tampered_user_id() {
        let config = test_config();
        let token = generate_token(&config, user(), NOW);
        let other = Uuid::parse_str("660e8400-e29b-41d4-a716-446655440000").unwrap();
        let tampered = token.replace(&user().to_string(), &other.to_string());

        let result = validate_token(&config, &tampered, NOW);
        assert!(matches!(result.unwrap_err(), TokenError::HmacMismatch));
    }

    #[test]
    fn reject_extended_timestamp() {
        let config = test_config();
        let token = generate_token(&config, user(), NOW);
        let tampered = token.replace(&format!("_{NOW}_"), &format!("_{}_", NOW + 86_400));

        let result = validate_token(&config, &tampered, NOW + 86_400);
        assert!(matches!(result.unwrap_err(), TokenError::HmacMismatch));
    }

    #[test]
    fn reject_wrong_secret() {
        let token = generate_token(&test_config(), user(), NOW);
        let wrong = SessionConfig::new(b"wrong-secret".to_vec());
        let result = validate_token(&wrong, &token, NOW);
        assert!(matches!(result.unwrap_err(), TokenError::HmacMismatch));
    }

    #[test]
    fn reject_malformed_tokens() {
        let config = test_config();
        for token in ["", "wrong_prefix_abc", "gc_st_short"] {
            let result = validate_token(&config, token, NOW);
            assert!(
                matches!(result, Err(TokenError::InvalidFormat(_))),
                "{token:?} gave {result:?}"
            );
        }
    }

    #[test]
    fn reject_invalid_uuid() {
        let result = validate_token(
            &test_config(),
            "gc_st_not-a-valid-uuid-at-all-noooooo_1_abcdef",
            NOW,
        );
        assert!(matches!(result.unwrap_err(), TokenError::InvalidUserId(_)));
    }

    #[test]
    fn reject_invalid_timestamp() {
        let token = format!("gc_st_{}_abc_deadbeef", user());
        let result = validate_token(&test_config(), &token, NOW);
        assert!(matches!(result.unwrap_err(), TokenError::InvalidTimestamp(_)));
    }

    #[test]
    fn reject_invalid_hex_in_hmac() {
        let token = format!("gc_st_{}_{NOW}_zzzz-not-hex!", user());
        let result = validate_token(&test_config(), &token, NOW);
        assert!(matches!(result.unwrap_err(), TokenError::InvalidFormat(_)));
    }

    #[test]
    fn same_inputs_produce_same_token() {
        let config = test_config();
        assert_eq!(
            generate_token(&config, user(), NOW),
            generate_token(&config, user(), NOW)
        );
        assert_ne!(
            generate_token(&config, user(), NOW),
            generate_token(&config, user(), NOW + 1)
        );
    }
}
