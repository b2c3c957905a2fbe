//! Application configuration.
//!
//! Settings come from an optional TOML file and are then overridden by
//! `TASKWRIGHT_*` environment variables. Every section has defaults except
//! the database URL and the JWT secret, which must be supplied.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for [`AppConfig`].
    #[error("failed to parse config: {0}")]
    Parse(Box<toml::de::Error>),
    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
    /// A setting failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Token and identity provider settings.
    pub auth: AuthConfig,
    /// Reporting windows for the admin dashboard.
    pub audit: AuditConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            pool_size: 10,
        }
    }
}

/// Token and identity provider settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for access tokens.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// OAuth client whose Google ID tokens are accepted.
    pub google_client_id: Option<String>,
    /// Firebase project whose ID tokens are accepted.
    pub firebase_project_id: Option<String>,
}

impl AuthConfig {
    /// Returns the token lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the lifetime does not fit a
    /// [`TimeDelta`].
    pub fn token_ttl(&self) -> Result<TimeDelta, ConfigError> {
        i64::try_from(self.token_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or(ConfigError::Invalid("auth.token_ttl_secs is too large"))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 7 * 24 * 60 * 60,
            google_client_id: None,
            firebase_project_id: None,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("google_client_id", &self.google_client_id)
            .field("firebase_project_id", &self.firebase_project_id)
            .finish()
    }
}

/// Reporting windows for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Days of login attempts summarised on the dashboard.
    pub login_stats_window_days: u32,
    /// Days within which an account counts as a recent signup.
    pub recent_signup_window_days: u32,
    /// Number of owners listed by task count.
    pub top_users_limit: usize,
}

impl AuditConfig {
    /// Returns the login statistics window.
    #[must_use]
    pub fn login_stats_window(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.login_stats_window_days))
    }

    /// Returns the recent signup window.
    #[must_use]
    pub fn recent_signup_window(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.recent_signup_window_days))
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            login_stats_window_days: 30,
            recent_signup_window_days: 7,
            top_users_limit: 10,
        }
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl TryFrom<&str> for LogFormat {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidEnv {
                name: "TASKWRIGHT_LOG_FORMAT",
                value: value.to_owned(),
            }),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    /// Output layout.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Loads the file at `path` (when given), applies environment
    /// overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, an
    /// override is malformed, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(file) => Self::from_file(file)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads configuration from a TOML file without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_toml(&content)
    }

    /// Parses configuration from TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed input.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(Box::new(err)))
    }

    /// Overrides settings with variables returned by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] when a numeric or enumerated
    /// variable cannot be parsed.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("TASKWRIGHT_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(size) = lookup("TASKWRIGHT_DATABASE_POOL_SIZE") {
            self.database.pool_size = parse_number("TASKWRIGHT_DATABASE_POOL_SIZE", size)?;
        }
        if let Some(secret) = lookup("TASKWRIGHT_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = lookup("TASKWRIGHT_TOKEN_TTL_SECS") {
            self.auth.token_ttl_secs = parse_number("TASKWRIGHT_TOKEN_TTL_SECS", ttl)?;
        }
        if let Some(client) = lookup("TASKWRIGHT_GOOGLE_CLIENT_ID") {
            self.auth.google_client_id = Some(client);
        }
        if let Some(project) = lookup("TASKWRIGHT_FIREBASE_PROJECT_ID") {
            self.auth.firebase_project_id = Some(project);
        }
        if let Some(filter) = lookup("TASKWRIGHT_LOG_FILTER") {
            self.logging.filter = filter;
        }
        if let Some(format) = lookup("TASKWRIGHT_LOG_FORMAT") {
            self.logging.format = LogFormat::try_from(format.as_str())?;
        }
        Ok(())
    }

    /// Checks settings that have no usable default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must be set"));
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::Invalid("database.pool_size must be positive"));
        }
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must be set"));
        }
        if self.auth.token_ttl_secs == 0 {
            return Err(ConfigError::Invalid("auth.token_ttl_secs must be positive"));
        }
        self.auth.token_ttl()?;
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}
