//! # configs
//!
//! Layered runtime settings: built-in defaults, then an optional
//! `config/artevia.toml`, then `ARTEVIA__*` environment variables
//! (`ARTEVIA__SERVER__PORT=9000`). A `.env` file is read first if present.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "ARTEVIA";
pub const CONFIG_FILE: &str = "config/artevia";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub media: MediaSettings,
    pub discovery: DiscoverySettings,
    pub log: LogSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "server.host",
                reason: e.to_string(),
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    pub upload_dir: String,
    pub url_prefix: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    pub default_radius_km: f64,
    pub unlock_radius_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set.
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// `["*"]` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Settings {
    /// Reads `.env`, the optional config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::build(Some(CONFIG_FILE), None)
    }

    /// Like [`load`](Self::load), but environment variables come from `vars`
    /// instead of the process and no file is read.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::build(None, Some(vars))
    }

    fn build(file: Option<&str>, vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.url", "sqlite://artevia.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("database.acquire_timeout_secs", 3)?
            .set_default("auth.token_ttl_minutes", 30)?
            .set_default("media.upload_dir", "uploads")?
            .set_default("media.url_prefix", "/uploads")?
            .set_default("media.max_upload_bytes", 10 * 1024 * 1024)?
            .set_default("discovery.default_radius_km", 5.0)?
            .set_default("discovery.unlock_radius_km", 1.0)?
            .set_default("log.format", "json")?
            .set_default("log.filter", "info")?
            .set_default("cors.allowed_origins", vec!["*"])?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("cors.allowed_origins")
            .source(vars);

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "auth.jwt_secret",
                reason: "must not be empty".into(),
            });
        }
        if self.auth.token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "auth.token_ttl_minutes",
                reason: "must be positive".into(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "database.max_connections",
                reason: "must be at least 1".into(),
            });
        }
        let radii = [
            ("discovery.default_radius_km", self.discovery.default_radius_km),
            ("discovery.unlock_radius_km", self.discovery.unlock_radius_km),
        ];
        for (key, value) in radii {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("must be a positive number of km, got {value}"),
                });
            }
        }
        Ok(())
    }
}
