//! # configs
//!
//! Layered settings for the discovery server:
//!
//! 1. built-in defaults,
//! 2. `config/default.{toml,yaml,json}` (optional),
//! 3. `config/{APP_ENV}.{toml,yaml,json}` (optional),
//! 4. environment variables prefixed `DISCOVER__`, e.g.
//!    `DISCOVER__SERVER__PORT=8080` or `DISCOVER__RATE_LIMIT__REQUESTS=50`.
//!
//! A `.env` file is loaded first when present.

mod settings;

pub use settings::{
    AuthSettings, DiscoverySettings, LogFormat, LoggingSettings, RateLimitSettings,
    ServerSettings, Settings, StaticToken, StorageBackend, StorageSettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
