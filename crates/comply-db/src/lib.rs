//! # comply-db
//!
//! libSQL persistence for the compliance engine.
//!
//! Handles all relational state: the framework catalog, compliance progress
//! counters, tasks, documents with their collaborator sets and version
//! history, threaded comments, and the audit trail.
//!
//! Uses the `libsql` crate (C `SQLite` fork) for native FTS5 and a stable
//! async API. Databases are local files or `:memory:`.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;
use retry::{RetryConfig, is_busy_error};

/// Central database handle for all compliance state.
///
/// Wraps a libSQL database and connection. Provides ID generation and
/// lock-aware statement execution; repository methods live on
/// [`service::ComplyService`].
pub struct ComplyDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    retry: RetryConfig,
}

impl ComplyDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on every open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open_local_with_retry(path, RetryConfig::default()).await
    }

    /// Open a local database with an explicit retry policy.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local_with_retry(
        path: &str,
        retry: RetryConfig,
    ) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Foreign keys are per-connection in SQLite
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let comply_db = Self { db, conn, retry };
        comply_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(comply_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// The retry policy this handle was opened with.
    #[must_use]
    pub const fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Generate a prefixed ID via libSQL. Returns e.g. `"tsk-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .query_with(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                || (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Execute a statement, retrying on write-lock contention.
    ///
    /// `params` is a factory because libSQL consumes parameters per call.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` on any non-busy failure, or the last
    /// busy error once attempts are exhausted.
    pub async fn execute_with<F, P>(&self, sql: &str, params: F) -> Result<u64, DatabaseError>
    where
        F: Fn() -> P,
        P: IntoParams,
    {
        let mut attempt = 1;
        loop {
            match self.conn.execute(sql, params()).await {
                Ok(n) => return Ok(n),
                Err(e) if is_busy_error(&e) && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(attempt, ?delay, error = %e, "database busy, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Run a query, retrying on write-lock contention.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute_with`].
    pub async fn query_with<F, P>(&self, sql: &str, params: F) -> Result<libsql::Rows, DatabaseError>
    where
        F: Fn() -> P,
        P: IntoParams,
    {
        let mut attempt = 1;
        loop {
            match self.conn.query(sql, params()).await {
                Ok(rows) => return Ok(rows),
                Err(e) if is_busy_error(&e) && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(attempt, ?delay, error = %e, "database busy, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> ComplyDb {
        ComplyDb::open_local(":memory:").await.unwrap()
    }

    async fn table_exists(db: &ComplyDb, name: &str) -> bool {
        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
            )
            .await
            .unwrap();
        rows.next().await.unwrap().is_some()
    }

    async fn seed_org_and_framework(db: &ComplyDb) {
        db.conn()
            .execute(
                "INSERT INTO organizations (id, name, created_at) VALUES ('org-t1', 'Acme', '2024-01-01T00:00:00.000000Z')",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO frameworks (id, type, name, created_at, updated_at) VALUES ('fwk-t1', 'SOC2', 'SOC 2', '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z')",
                (),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let tables = [
            "organizations",
            "users",
            "frameworks",
            "compliance_progress",
            "tasks",
            "documents",
            "document_collaborators",
            "document_versions",
            "comments",
            "audit_trail",
            "documents_fts",
        ];
        for table in tables {
            assert!(table_exists(&db, table).await, "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("tsk").await.unwrap();
        assert!(id.starts_with("tsk-"), "ID should start with 'tsk-': {id}");
        assert_eq!(id.len(), 12, "3 prefix + 1 dash + 8 hex: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in comply_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("doc").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO users (id, organization_id, email, name, created_at) VALUES ('usr-t1', 'org-missing', 'a@b.c', 'A', '2024-01-01T00:00:00.000000Z')",
                (),
            )
            .await;
        assert!(result.is_err(), "dangling organization_id must be rejected");
    }

    #[tokio::test]
    async fn progress_pair_is_unique() {
        let db = test_db().await;
        seed_org_and_framework(&db).await;

        let insert = |id: &'static str| {
            format!(
                "INSERT INTO compliance_progress (id, organization_id, framework_id, created_at, updated_at) VALUES ('{id}', 'org-t1', 'fwk-t1', '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z')"
            )
        };
        db.conn().execute(&insert("prg-t1"), ()).await.unwrap();
        let err = db
            .execute_with(&insert("prg-t2"), || ())
            .await
            .expect_err("duplicate pair must be rejected");
        assert!(retry::is_unique_violation(&err), "{err}");
    }

    #[tokio::test]
    async fn comment_selection_is_all_or_nothing() {
        let db = test_db().await;
        seed_org_and_framework(&db).await;
        db.conn().execute_batch(
            "INSERT INTO users (id, organization_id, email, name, created_at) VALUES ('usr-t1', 'org-t1', 'a@b.c', 'A', '2024-01-01T00:00:00.000000Z');
             INSERT INTO documents (id, title, framework_id, organization_id, created_by_id, created_at, updated_at) VALUES ('doc-t1', 'Policy', 'fwk-t1', 'org-t1', 'usr-t1', '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z');",
        )
        .await
        .unwrap();

        let partial = db
            .conn()
            .execute(
                "INSERT INTO comments (id, document_id, author_id, content, selection_start, created_at, updated_at) VALUES ('cmt-t1', 'doc-t1', 'usr-t1', 'hi', 3, '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z')",
                (),
            )
            .await;
        assert!(partial.is_err(), "partial selection must be rejected");
    }

    #[tokio::test]
    async fn fts_trigger_populates_on_insert() {
        let db = test_db().await;
        seed_org_and_framework(&db).await;
        db.conn().execute_batch(
            "INSERT INTO users (id, organization_id, email, name, created_at) VALUES ('usr-t1', 'org-t1', 'a@b.c', 'A', '2024-01-01T00:00:00.000000Z');
             INSERT INTO documents (id, title, content, framework_id, organization_id, created_by_id, created_at, updated_at) VALUES ('doc-t1', 'Access Control Policy', 'Passwords rotate quarterly', 'fwk-t1', 'org-t1', 'usr-t1', '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z');",
        )
        .await
        .unwrap();

        let mut rows = db
            .conn()
            .query(
                "SELECT rowid FROM documents_fts WHERE documents_fts MATCH 'passwords'",
                (),
            )
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn on_disk_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comply.db");
        let path = path.to_str().unwrap();

        {
            let db = ComplyDb::open_local(path).await.unwrap();
            seed_org_and_framework(&db).await;
        }

        let db = ComplyDb::open_local(path).await.unwrap();
        let mut rows = db
            .conn()
            .query("SELECT name FROM organizations WHERE id = 'org-t1'", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "Acme");
    }
}
