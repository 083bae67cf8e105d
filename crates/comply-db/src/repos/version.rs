//! Document version engine.
//!
//! Versions are immutable snapshots. The next version string is derived
//! from the latest stored one; the `UNIQUE (document_id, version)`
//! constraint turns a concurrent append into a conflict, which is resolved
//! by re-reading the latest version and trying again.

use comply_core::audit_detail::VersionAppendedDetail;
use comply_core::entities::DocumentVersion;
use comply_core::enums::{AuditAction, EntityType};
use comply_core::ids::PREFIX_VERSION;
use comply_core::versioning::next_version;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, now, parse_datetime, parse_optional_json};
use crate::retry::is_unique_violation;
use crate::service::ComplyService;

const SELECT_COLS: &str =
    "id, document_id, version, content, change_log, metadata, created_by_id, created_at";

fn row_to_version(row: &libsql::Row) -> Result<DocumentVersion, DatabaseError> {
    Ok(DocumentVersion {
        id: row.get(0)?,
        document_id: row.get(1)?,
        version: row.get(2)?,
        content: row.get(3)?,
        change_log: get_opt_string(row, 4)?,
        metadata: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
        created_by_id: row.get(6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl ComplyService {
    /// Append the next version of a document.
    ///
    /// The first version of a document is `1.0.0`; every later one bumps the
    /// patch component of the latest.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the document or author is missing.
    /// - `Core(InvalidVersion)` if the latest stored version is malformed.
    /// - `ConflictOnCreate` if concurrent appends keep winning past the
    ///   retry budget.
    pub async fn append_version(
        &self,
        document_id: &str,
        content: &str,
        change_log: Option<&str>,
        metadata: Option<&serde_json::Value>,
        author_id: &str,
    ) -> Result<DocumentVersion, DatabaseError> {
        self.ensure_exists(EntityType::Document, document_id).await?;
        self.ensure_exists(EntityType::User, author_id).await?;

        let attempts = self.conflict_attempts();
        for attempt in 1..=attempts {
            let latest = self.latest_version(document_id).await?;
            let version = next_version(latest.as_ref().map(|v| v.version.as_str()))?;

            match self
                .insert_version(document_id, &version, content, change_log, metadata, author_id)
                .await
            {
                Ok(created) => {
                    tracing::debug!(document_id, version = %created.version, "version appended");
                    let detail = VersionAppendedDetail {
                        version_id: created.id.clone(),
                        version: created.version.clone(),
                        change_log: created.change_log.clone(),
                    };
                    self.record_committed_detail(
                        EntityType::Document,
                        document_id,
                        AuditAction::VersionAppended,
                        &detail,
                    )
                    .await?;
                    return Ok(created);
                }
                Err(e) if is_unique_violation(&e) => {
                    tracing::warn!(document_id, %version, attempt, "version append raced, re-reading");
                }
                Err(e) => return Err(e),
            }
        }
        Err(DatabaseError::ConflictOnCreate {
            entity: EntityType::DocumentVersion,
            key: document_id.to_string(),
            attempts,
        })
    }

    async fn insert_version(
        &self,
        document_id: &str,
        version: &str,
        content: &str,
        change_log: Option<&str>,
        metadata: Option<&serde_json::Value>,
        author_id: &str,
    ) -> Result<DocumentVersion, DatabaseError> {
        let now = now();
        let id = self.db().generate_id(PREFIX_VERSION).await?;
        let ts = format_datetime(&now);
        let metadata_json = metadata.map(ToString::to_string);

        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO document_versions ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                || {
                    libsql::params![
                        id.as_str(),
                        document_id,
                        version,
                        content,
                        change_log,
                        metadata_json.as_deref(),
                        author_id,
                        ts.as_str()
                    ]
                },
            )
            .await?;

        Ok(DocumentVersion {
            id,
            document_id: document_id.to_string(),
            version: version.to_string(),
            content: content.to_string(),
            change_log: change_log.map(String::from),
            metadata: metadata.cloned(),
            created_by_id: author_id.to_string(),
            created_at: now,
        })
    }

    /// The most recently created version, if the document has any.
    pub async fn latest_version(
        &self,
        document_id: &str,
    ) -> Result<Option<DocumentVersion>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM document_versions WHERE document_id = ?1
                     ORDER BY created_at DESC, rowid DESC LIMIT 1"
                ),
                || [document_id],
            )
            .await?;
        rows.next()
            .await?
            .map(|row| row_to_version(&row))
            .transpose()
    }

    pub async fn get_version(&self, id: &str) -> Result<DocumentVersion, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM document_versions WHERE id = ?1"),
                || [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::DocumentVersion, id))?;
        row_to_version(&row)
    }

    /// Version history in creation order, oldest first.
    pub async fn list_versions(
        &self,
        document_id: &str,
    ) -> Result<Vec<DocumentVersion>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM document_versions WHERE document_id = ?1
                     ORDER BY created_at ASC, rowid ASC"
                ),
                || [document_id],
            )
            .await?;
        let mut versions = Vec::new();
        while let Some(row) = rows.next().await? {
            versions.push(row_to_version(&row)?);
        }
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::document::NewDocument;
    use crate::test_support::helpers::{Fixture, fixture, test_service};
    use comply_core::enums::FrameworkType;
    use comply_core::errors::CoreError;
    use pretty_assertions::assert_eq;

    async fn document(svc: &ComplyService, fx: &Fixture) -> String {
        svc.create_document(
            NewDocument {
                title: "Access Control Policy".into(),
                content: "v0".into(),
                framework_id: fx.framework.id.clone(),
                organization_id: fx.org.id.clone(),
                ..NewDocument::default()
            },
            &fx.user.id,
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn appends_bump_patch() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::PciDss).await;
        let doc_id = document(&svc, &fx).await;

        let v1 = svc
            .append_version(&doc_id, "v1", Some("tighten MFA"), None, &fx.user.id)
            .await
            .unwrap();
        let v2 = svc
            .append_version(&doc_id, "v2", None, None, &fx.user.id)
            .await
            .unwrap();

        assert_eq!(v1.version, "1.0.1");
        assert_eq!(v2.version, "1.0.2");
        assert_eq!(svc.latest_version(&doc_id).await.unwrap(), Some(v2.clone()));
        assert_eq!(svc.get_version(&v1.id).await.unwrap(), v1);
    }

    #[tokio::test]
    async fn history_is_oldest_first() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::PciDss).await;
        let doc_id = document(&svc, &fx).await;
        for i in 1..=3 {
            svc.append_version(&doc_id, &format!("v{i}"), None, None, &fx.user.id)
                .await
                .unwrap();
        }

        let versions: Vec<String> = svc
            .list_versions(&doc_id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.version)
            .collect();
        assert_eq!(versions, vec!["1.0.0", "1.0.1", "1.0.2", "1.0.3"]);
    }

    #[tokio::test]
    async fn metadata_snapshot_is_stored() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::PciDss).await;
        let doc_id = document(&svc, &fx).await;
        let meta = serde_json::json!({"reviewed_by": "legal"});

        let v = svc
            .append_version(&doc_id, "v1", None, Some(&meta), &fx.user.id)
            .await
            .unwrap();
        assert_eq!(svc.get_version(&v.id).await.unwrap().metadata, Some(meta));
    }

    #[tokio::test]
    async fn append_to_missing_document_is_not_found() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::PciDss).await;
        let result = svc
            .append_version("doc-missing", "x", None, None, &fx.user.id)
            .await;
        assert!(matches!(
            result,
            Err(DatabaseError::NotFound {
                entity: EntityType::Document,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn malformed_latest_version_is_reported() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::PciDss).await;
        let doc_id = document(&svc, &fx).await;
        svc.db()
            .conn()
            .execute(
                "UPDATE document_versions SET version = '1.0.0.0' WHERE document_id = ?1",
                [doc_id.as_str()],
            )
            .await
            .unwrap();

        let result = svc
            .append_version(&doc_id, "v1", None, None, &fx.user.id)
            .await;
        assert!(matches!(
            result,
            Err(DatabaseError::Core(CoreError::InvalidVersion { .. }))
        ));
    }

    #[tokio::test]
    async fn duplicate_version_string_is_rejected_by_storage() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::PciDss).await;
        let doc_id = document(&svc, &fx).await;

        let err = svc
            .insert_version(&doc_id, "1.0.0", "dup", None, None, &fx.user.id)
            .await
            .expect_err("same version twice");
        assert!(is_unique_violation(&err));
    }
}
