use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error as ThisError;

/// Optional on-disk configuration, merged below environment variables.
pub const CONFIG_FILE: &str = "bookstore.toml";

const ENV_KEYS: &[&str] = &[
    "DATABASE_URL",
    "LISTEN_ADDR",
    "LOGLEVEL",
    "AUTH_ENABLED",
    "JWT_SECRET",
    "JWT_TTL_SECS",
    "REQUEST_TIMEOUT_SECS",
    "NODE_ENV",
];

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Process-wide settings. Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
    /// Unset means disabled. Values that are not booleans fail to load.
    pub auth_enabled: bool,
    pub jwt_secret: Option<String>,
    pub jwt_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub node_env: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:bookstore.db".to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            loglevel: "info".to_string(),
            auth_enabled: false,
            jwt_secret: None,
            jwt_ttl_secs: 3600,
            request_timeout_secs: 30,
            node_env: "development".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then `bookstore.toml`, then environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::raw().only(ENV_KEYS)),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let cfg: Config = figment.extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.as_deref().is_none_or(|s| s.trim().is_empty()) {
            return Err(ConfigError::MissingSecret);
        }
        if self.jwt_ttl_secs == 0 {
            return Err(ConfigError::ZeroDuration("JWT_TTL_SECS"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration("REQUEST_TIMEOUT_SECS"));
        }
        Ok(())
    }

    /// The signing secret. `validate` guarantees it is present after `load`.
    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or_default()
    }

    pub fn jwt_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.node_env == "production"
    }
}
