//! Service layer orchestrating database mutations with their audit trail
//! and dependent side effects.
//!
//! `ComplyService` wraps `ComplyDb` (raw database access) and the caller's
//! identity. All repo methods are implemented as `impl ComplyService` blocks
//! in `crate::repos`.

use std::path::Path;

use comply_config::DatabaseConfig;
use comply_core::identity::AuthIdentity;

use crate::ComplyDb;
use crate::error::DatabaseError;
use crate::retry::RetryConfig;

/// Orchestrates database mutations with audit entries and side effects.
///
/// Every mutation method follows this protocol:
/// 1. Verify every referenced id (`NotFound` / `InvalidReference`)
/// 2. Execute the primary SQL write
/// 3. Append an audit entry attributed to the acting identity
/// 4. Run dependent side effects (progress recompute, version append,
///    progress init); a failure here is reported as `PartialFailure` and
///    never undoes step 2
pub struct ComplyService {
    db: ComplyDb,
    identity: Option<AuthIdentity>,
}

impl ComplyService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `identity` - The authenticated caller, used to attribute audit entries.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(
        db_path: &str,
        identity: Option<AuthIdentity>,
    ) -> Result<Self, DatabaseError> {
        let db = ComplyDb::open_local(db_path).await?;
        Ok(Self { db, identity })
    }

    /// Open the database described by configuration, creating its parent
    /// directory when needed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created or the
    /// database cannot be opened.
    pub async fn open(
        config: &DatabaseConfig,
        identity: Option<AuthIdentity>,
    ) -> Result<Self, DatabaseError> {
        if !config.is_in_memory()
            && let Some(parent) = Path::new(&config.path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Other(anyhow::anyhow!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let retry = RetryConfig::with_attempts(config.conflict_retries);
        let db = ComplyDb::open_local_with_retry(&config.path, retry).await?;
        Ok(Self { db, identity })
    }

    /// Create from an existing `ComplyDb`.
    #[must_use]
    pub const fn from_db(db: ComplyDb, identity: Option<AuthIdentity>) -> Self {
        Self { db, identity }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ComplyDb {
        &self.db
    }

    /// The identity this service acts as, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&AuthIdentity> {
        self.identity.as_ref()
    }

    /// Replace the acting identity.
    pub fn set_identity(&mut self, identity: Option<AuthIdentity>) {
        self.identity = identity;
    }

    /// User id recorded as the actor on audit entries.
    #[must_use]
    pub fn actor_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.user_id.as_str())
    }

    /// Attempts allowed for find-or-create and version-append races.
    #[must_use]
    pub const fn conflict_attempts(&self) -> u32 {
        self.db.retry().max_attempts
    }
}
