//! Database configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default database location, relative to the working directory.
fn default_path() -> String {
    String::from(".comply/comply.db")
}

/// Default number of attempts for find-or-create and version-append conflicts.
const fn default_conflict_retries() -> u32 {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,

    /// Attempts (including the first) when a unique-key race is detected.
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            conflict_retries: default_conflict_retries(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the database lives only in memory.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }

    /// Check the values that cannot be expressed through serde defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty path or zero retries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.conflict_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.conflict_retries".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
