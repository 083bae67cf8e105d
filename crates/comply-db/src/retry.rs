//! Retry policy for lock contention and unique-key races.
//!
//! Two failure classes are retried:
//! - `SQLITE_BUSY` / "database is locked" when another connection holds the
//!   write lock on a shared database file. Retried with exponential backoff
//!   inside `ComplyDb::execute_with` and `ComplyDb::query_with`.
//! - Unique-constraint violations during find-or-create and version append.
//!   These are not retried blindly; the repo re-reads and tries again as a
//!   lookup, bounded by `max_attempts`.
//!
//! The predicates are narrow: genuine SQL or foreign-key errors never match.

use std::time::Duration;

use crate::error::DatabaseError;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(25),
            max_delay: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Build from `database.conflict_retries`. Zero is clamped to one attempt.
    #[must_use]
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (1-based), capped at `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Bounded find-or-create.
///
/// Each attempt looks the row up, then tries to insert it. A unique
/// violation means another writer won; the next attempt finds its row. After
/// the last attempt the row is looked up once more, so a lost race only comes
/// back as `None` when the winner's row is still not visible.
///
/// # Errors
///
/// Propagates any lookup error and any insert error other than a unique
/// violation.
pub(crate) async fn find_or_create<T, Find, FindFut, Create, CreateFut>(
    key: &str,
    attempts: u32,
    mut find: Find,
    mut create: Create,
) -> Result<Option<T>, DatabaseError>
where
    Find: FnMut() -> FindFut,
    FindFut: Future<Output = Result<Option<T>, DatabaseError>>,
    Create: FnMut() -> CreateFut,
    CreateFut: Future<Output = Result<T, DatabaseError>>,
{
    for attempt in 1..=attempts {
        if let Some(existing) = find().await? {
            return Ok(Some(existing));
        }
        match create().await {
            Ok(created) => return Ok(Some(created)),
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(key, attempt, "create raced, re-reading");
            }
            Err(e) => return Err(e),
        }
    }
    find().await
}

/// Detect write-lock contention on a shared database file.
pub fn is_busy_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked") || msg.contains("SQLITE_BUSY")
}

/// Detect a unique-constraint violation (a lost find-or-create race).
pub fn is_unique_violation(e: &DatabaseError) -> bool {
    match e {
        DatabaseError::LibSql(inner) => inner.to_string().contains("UNIQUE constraint failed"),
        _ => false,
    }
}
