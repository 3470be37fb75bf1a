use std::env;

/// Database configuration.
///
/// Reads from the `GYMCOACH_DATABASE_URL` environment variable, falling back
/// to `postgresql://localhost:5432/gymcoach` when unset.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL.
    pub database_url: String,
}

impl DbConfig {
    /// The default connection URL used when no environment variable is set.
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/gymcoach";

    /// Environment variable holding the connection URL.
    pub const ENV_VAR: &str = "GYMCOACH_DATABASE_URL";

    /// Build a config from the environment, falling back to [`Self::DEFAULT_URL`].
    pub fn from_env() -> Self {
        let database_url =
            env::var(Self::ENV_VAR).unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        Self { database_url }
    }

    /// Build a config from an explicit URL (useful for tests and CLI flags).
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Extract the database name from the URL.
    ///
    /// Query parameters are ignored. Returns `None` when the URL has no path
    /// component.
    pub fn database_name(&self) -> Option<&str> {
        let without_query = self
            .database_url
            .split_once('?')
            .map_or(self.database_url.as_str(), |(base, _)| base);
        let (_, name) = without_query.rsplit_once('/')?;
        if name.is_empty() || name.contains(':') {
            None
        } else {
            Some(name)
        }
    }

    /// Return a URL pointing at the `postgres` maintenance database on the
    /// same host. Used to issue `CREATE DATABASE` when the target DB does not
    /// yet exist.
    pub fn maintenance_url(&self) -> String {
        match self.database_url.rfind('/') {
            Some(pos) => {
                let mut url = self.database_url[..pos].to_owned();
                url.push_str("/postgres");
                url
            }
            None => self.database_url.clone(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let cfg = DbConfig::new(DbConfig::DEFAULT_URL);
        assert_eq!(cfg.database_url, "postgresql://localhost:5432/gymcoach");
        assert_eq!(cfg.database_name(), Some("gymcoach"));
    }

    #[test]
    fn database_name_ignores_query() {
        let cfg = DbConfig::new("postgresql://localhost:5432/coach?sslmode=disable");
        assert_eq!(cfg.database_name(), Some("coach"));
    }

    #[test]
    fn database_name_missing() {
        let cfg = DbConfig::new("postgresql://localhost:5432");
        assert_eq!(cfg.database_name(), None);
    }

    #[test]
    fn maintenance_url_replaces_db() {
        let cfg = DbConfig::new("postgresql://localhost:5432/gymcoach");
        assert_eq!(cfg.maintenance_url(), "postgresql://localhost:5432/postgres");
    }
}
