use std::env;
use std::fmt;

/// Signing secrets shorter than this are refused at startup.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_HOURS: i64 = 24 * 365;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Process configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub server_host: String,
    pub server_port: u16,
    /// Connections kept open in the pool.
    pub db_pool_size: u32,
    /// Extra connections the pool may open under load.
    pub db_max_overflow: u32,
    pub db_acquire_timeout_secs: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(
                f,
                "Required environment variable {} is not set. Please set it in .env file or environment.",
                key
            ),
            ConfigError::Invalid { key, reason } => write!(f, "Invalid {}: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let config = Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_hours: parse_or(&lookup, "JWT_EXPIRATION_HOURS", 24)?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            cors_origins,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or(&lookup, "SERVER_PORT", 8000)?,
            db_pool_size: parse_or(&lookup, "DB_POOL_SIZE", 5)?,
            db_max_overflow: parse_or(&lookup, "DB_MAX_OVERFLOW", 10)?,
            db_acquire_timeout_secs: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 30)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(invalid(
                "DATABASE_URL",
                "must start with 'postgresql://' or 'postgres://'",
            ));
        }
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(invalid(
                "JWT_SECRET",
                format!("must be at least {} bytes long", MIN_SECRET_LEN),
            ));
        }
        if !(1..=MAX_TOKEN_HOURS).contains(&self.jwt_expiration_hours) {
            return Err(invalid(
                "JWT_EXPIRATION_HOURS",
                format!("must be between 1 and {}", MAX_TOKEN_HOURS),
            ));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(invalid("BCRYPT_COST", "must be between 4 and 31"));
        }
        if self.cors_origins.is_empty() {
            return Err(invalid("CORS_ORIGINS", "must contain at least one origin"));
        }
        if self.db_pool_size == 0 {
            return Err(invalid("DB_POOL_SIZE", "must be at least 1"));
        }
        Ok(())
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        chrono::Duration::try_hours(self.jwt_expiration_hours)
            .ok_or_else(|| invalid("JWT_EXPIRATION_HOURS", "out of range"))
    }

    /// Upper bound of open connections: the steady pool plus its overflow.
    pub fn db_max_connections(&self) -> u32 {
        self.db_pool_size + self.db_max_overflow
    }

    /// Database location with the credentials cut off, for logging.
    pub fn database_host(&self) -> &str {
        self.database_url
            .rsplit('@')
            .next()
            .unwrap_or(&self.database_url)
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(key, format!("'{}' is not a valid number", raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgres://user:pw@db.internal:5432/tasks"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.server_port, 8000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.jwt_expiration_hours, 24);
        assert_eq!(config.bcrypt_cost, 12);
        assert_eq!(config.db_max_connections(), 15);
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
        assert_eq!(config.database_host(), "db.internal:5432/tasks");
        assert_eq!(config.token_ttl().unwrap(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_config_custom_values() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/tasks"),
            ("JWT_SECRET", SECRET),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "127.0.0.1"),
            ("CORS_ORIGINS", " https://app.example.com , ,https://admin.example.com"),
            ("JWT_EXPIRATION_HOURS", "2"),
        ])
        .unwrap();

        assert_eq!(config.server_url(), "http://127.0.0.1:3000");
        assert_eq!(
            config.cors_origins,
            vec!["https://app.example.com", "https://admin.example.com"]
        );
        assert_eq!(config.token_ttl().unwrap(), chrono::Duration::hours(2));
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/tasks"),
            ("JWT_SECRET", "too-short"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_SECRET", .. }));
    }

    #[test]
    fn test_token_lifetime_bounds() {
        let with_hours = |hours: &str| {
            load(&[
                ("DATABASE_URL", "postgres://localhost/tasks"),
                ("JWT_SECRET", SECRET),
                ("JWT_EXPIRATION_HOURS", hours),
            ])
        };

        let config = with_hours("8760").unwrap();
        assert_eq!(config.token_ttl().unwrap(), chrono::Duration::hours(MAX_TOKEN_HOURS));

        for hours in ["0", "-1", "8761", "2000000000000", "9223372036854775807"] {
            let err = with_hours(hours).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "JWT_EXPIRATION_HOURS", .. }),
                "{}",
                hours
            );
        }

        // Hand-built configs skip validation but still must not panic.
        let mut config = with_hours("24").unwrap();
        config.jwt_expiration_hours = i64::MAX;
        assert!(config.token_ttl().is_err());
    }

    #[test]
    fn test_missing_and_malformed_values() {
        assert_eq!(
            load(&[("JWT_SECRET", SECRET)]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );

        let err = load(&[
            ("DATABASE_URL", "mysql://localhost/tasks"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DATABASE_URL", .. }));

        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/tasks"),
            ("JWT_SECRET", SECRET),
            ("SERVER_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SERVER_PORT", .. }));

        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/tasks"),
            ("JWT_SECRET", SECRET),
            ("CORS_ORIGINS", " , "),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CORS_ORIGINS", .. }));
    }
}
