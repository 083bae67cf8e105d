//! # comply-config
//!
//! Layered configuration loading for the compliance engine using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`COMPLY_*` prefix, `__` as separator)
//! 2. Externally supplied overrides (see [`ComplyConfig::load_with_env_overrides`])
//! 3. Project-level `.comply/config.toml`
//! 4. User-level `~/.config/comply/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `COMPLY_DATABASE__PATH` -> `database.path`,
//! `COMPLY_GENERAL__DEFAULT_LIMIT` -> `general.default_limit`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use comply_config::ComplyConfig;
//!
//! let config = ComplyConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.database.path);
//! ```

mod database;
mod error;
mod general;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "COMPLY_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ComplyConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl ComplyConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env_overrides(&[])
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration, layering `COMPLY_*` key/value pairs from an
    /// external source underneath the process environment.
    ///
    /// A variable already present in the process environment always wins
    /// over the override with the same name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load_with_env_overrides(overrides: &[(String, String)]) -> Result<Self, ConfigError> {
        let mut figment = Self::file_figment();

        for (key, value) in overrides {
            if std::env::var_os(key).is_some() {
                continue;
            }
            let Some(path) = env_key_to_path(key) else {
                continue;
            };
            let value: Value = value.parse().unwrap_or_else(|never| match never {});
            figment = figment.merge(Serialized::default(&path, value));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Self = figment.extract()?;
        config.database.validate()?;
        Ok(config)
    }

    /// Build the provider chain: defaults, user-global TOML, project TOML,
    /// and the process environment.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Self::file_figment().merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn file_figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".comply/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("comply").join("config.toml"))
    }
}

/// `COMPLY_DATABASE__PATH` -> `database.path`. `None` for foreign keys.
fn env_key_to_path(key: &str) -> Option<String> {
    let stripped = key.strip_prefix(ENV_PREFIX)?;
    if stripped.is_empty() {
        return None;
    }
    Some(
        stripped
            .split("__")
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>()
            .join("."),
    )
}
