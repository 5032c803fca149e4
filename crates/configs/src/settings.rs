use crate::ConfigError;
use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "DISCOVER";

/// Root configuration structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub rate_limit: RateLimitSettings,
    pub discovery: DiscoverySettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Take the client address from `X-Forwarded-For`. Only safe behind a
    /// reverse proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            trust_forwarded_for: false,
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Development-only bearer token mapped to a fixed identity.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticToken {
    pub token: String,
    pub user_id: String,
    #[serde(default)]
    pub badges: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 secret for bearer tokens.
    pub jwt_secret: Option<SecretString>,
    pub issuer: Option<String>,
    pub static_tokens: Vec<StaticToken>,
}

/// Budget of the discovery route, keyed per requester.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub requests: u32,
    pub window_ms: u64,
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            requests: 20,
            window_ms: 20_000,
            sweep_interval_secs: 60,
        }
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Page size applied by the retrieval backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// JSON seed for the memory backend.
    pub seed_path: Option<PathBuf>,
    pub database_url: Option<SecretString>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Loads `.env`, then layers `config/` files and `DISCOVER__*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(error = %err, "ignoring unreadable .env file");
            }
        }
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        Self::load_from(
            Path::new("config"),
            &env,
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    /// Loads from an explicit directory and environment source.
    pub fn load_from(dir: &Path, env: &str, environment: Environment) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false))
            .add_source(File::with_name(&dir.join(env).to_string_lossy()).required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.requests == 0 {
            return Err(ConfigError::Invalid("rate_limit.requests must be positive".into()));
        }
        if self.rate_limit.window_ms == 0 {
            return Err(ConfigError::Invalid("rate_limit.window_ms must be positive".into()));
        }
        if self.rate_limit.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.sweep_interval_secs must be positive".into(),
            ));
        }
        if self.discovery.default_limit > self.discovery.max_limit {
            return Err(ConfigError::Invalid(format!(
                "discovery.default_limit ({}) exceeds discovery.max_limit ({})",
                self.discovery.default_limit, self.discovery.max_limit
            )));
        }
        if self.storage.backend == StorageBackend::Postgres {
            if !cfg!(feature = "db-postgres") {
                return Err(ConfigError::Invalid(
                    "storage.backend = postgres requires the db-postgres feature".into(),
                ));
            }
            if self.storage.database_url.is_none() {
                return Err(ConfigError::Invalid(
                    "storage.database_url is required for the postgres backend".into(),
                ));
            }
        }
        if self.auth.jwt_secret.is_some() && !cfg!(feature = "auth-jwt") {
            return Err(ConfigError::Invalid(
                "auth.jwt_secret requires the auth-jwt feature".into(),
            ));
        }
        if self.auth.jwt_secret.is_none() && self.auth.static_tokens.is_empty() {
            return Err(ConfigError::Invalid(
                "configure auth.jwt_secret or at least one auth.static_tokens entry".into(),
            ));
        }
        Ok(())
    }
}
