//! Configuration file management for gymcoach.
//!
//! Provides a TOML-based config file at `~/.config/gymcoach/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use gymcoach_core::chat::{self, ChatConfig};
use gymcoach_core::token::{DEFAULT_TTL_SECS, SessionConfig, TOKEN_SECRET_ENV, TokenError};
use gymcoach_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub auth: AuthSection,
    #[serde(default)]
    pub chat: ChatSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthSection {
    /// Hex-encoded session signing secret (64 hex chars = 32 bytes).
    pub token_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_ttl_secs: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChatSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the gymcoach config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/gymcoach` or `~/.config/gymcoach`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("gymcoach");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("gymcoach")
}

/// Return the path to the gymcoach config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file holds secrets.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Generate a random session secret: 32 random bytes, hex-encoded (64 chars).
pub fn generate_token_secret() -> String {
    use rand::Rng;
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

// -----------------------------------------------------------------------
// Resolution
// -----------------------------------------------------------------------

/// DB URL: `cli_db_url` > `GYMCOACH_DATABASE_URL` > config file > default.
fn resolve_db(cli_db_url: Option<&str>, file: Option<&ConfigFile>) -> DbConfig {
    let db_url = if let Some(url) = cli_db_url {
        url.to_string()
    } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
        url
    } else if let Some(cfg) = file {
        cfg.database.url.clone()
    } else {
        DbConfig::DEFAULT_URL.to_string()
    };
    DbConfig::new(db_url)
}

/// Resolve only the database connection settings. Used by commands that
/// never touch sessions or chat.
pub fn resolve_db_config(cli_db_url: Option<&str>) -> DbConfig {
    let file_config = load_config().ok();
    resolve_db(cli_db_url, file_config.as_ref())
}

/// Chat settings: env vars > config file > defaults. A missing API key is
/// not an error here; the chat endpoint reports it per request.
fn resolve_chat(file: Option<&ConfigFile>) -> ChatConfig {
    let from_env = ChatConfig::from_env();
    let section = file.map(|f| &f.chat);

    let api_key = from_env
        .api_key
        .or_else(|| section.and_then(|s| s.api_key.clone()))
        .filter(|k| !k.trim().is_empty());
    let base_url = std::env::var(chat::BASE_URL_ENV)
        .ok()
        .or_else(|| section.and_then(|s| s.base_url.clone()))
        .unwrap_or_else(|| chat::DEFAULT_BASE_URL.to_owned());
    let model = std::env::var(chat::MODEL_ENV)
        .ok()
        .or_else(|| section.and_then(|s| s.model.clone()))
        .unwrap_or_else(|| chat::DEFAULT_MODEL.to_owned());
    let max_tokens = section
        .and_then(|s| s.max_tokens)
        .unwrap_or(chat::DEFAULT_MAX_TOKENS);

    ChatConfig {
        api_key,
        base_url,
        model,
        max_tokens,
        ..ChatConfig::default()
    }
}

/// Fully resolved configuration for the HTTP server.
#[derive(Debug)]
pub struct CoachConfig {
    pub db_config: DbConfig,
    pub session_config: SessionConfig,
    pub chat_config: ChatConfig,
}

impl CoachConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// The session secret has no default: `GYMCOACH_TOKEN_SECRET` env >
    /// `config_file.auth.token_secret` > error.
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();
        let db_config = resolve_db(cli_db_url, file_config.as_ref());

        let session_config = match SessionConfig::from_env() {
            Ok(cfg) => cfg,
            Err(TokenError::MissingSecret) => match file_config {
                Some(ref cfg) => SessionConfig::new(
                    hex::decode(&cfg.auth.token_secret)
                        .context("invalid hex in config file token_secret")?,
                ),
                None => bail!(
                    "token secret not found; set {TOKEN_SECRET_ENV} or run `gymcoach init` to create a config file"
                ),
            },
            Err(e) => return Err(e).context("failed to read session secret from the environment"),
        };
        let ttl_secs = file_config
            .as_ref()
            .and_then(|cfg| cfg.auth.session_ttl_secs)
            .unwrap_or(DEFAULT_TTL_SECS);
        let session_config = session_config.with_ttl(ttl_secs);

        if session_config.secret.is_empty() {
            bail!("token secret must not be empty");
        }

        let chat_config = resolve_chat(file_config.as_ref());

        Ok(Self {
            db_config,
            session_config,
            chat_config,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
