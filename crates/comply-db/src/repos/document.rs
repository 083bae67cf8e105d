//! Document store repository.
//!
//! Documents carry a duplicate-free collaborator set and own their version
//! history and comments (both removed by cascade on delete). Creating a
//! document appends version `1.0.0` and makes sure the organization has a
//! progress row for the framework; a content-changing update appends the
//! next version.

use comply_core::audit_detail::{CollaboratorDetail, StatusChangedDetail};
use comply_core::entities::Document;
use comply_core::enums::{AuditAction, DocumentStatus, EntityType, SideEffect};
use comply_core::ids::PREFIX_DOCUMENT;
use comply_core::versioning::INITIAL_CHANGE_LOG;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_opt_string, get_u32, now, opt_value, parse_datetime, parse_enum,
    parse_optional_json, to_json_value,
};
use crate::service::ComplyService;
use crate::updates::document::DocumentUpdate;

const SELECT_COLS: &str = "id, title, description, content, status, progress, template_id, \
     metadata, framework_id, organization_id, created_by_id, created_at, updated_at";

const SELECT_COLS_D: &str = "d.id, d.title, d.description, d.content, d.status, d.progress, \
     d.template_id, d.metadata, d.framework_id, d.organization_id, d.created_by_id, \
     d.created_at, d.updated_at";

/// Input for [`ComplyService::create_document`].
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    /// Defaults to `draft`.
    pub status: Option<DocumentStatus>,
    /// Author-supplied completion, 0 to 100. Defaults to 0.
    pub progress: Option<u8>,
    pub template_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub framework_id: String,
    pub organization_id: String,
    pub collaborator_ids: Vec<String>,
}

fn row_to_document(row: &libsql::Row) -> Result<Document, DatabaseError> {
    let progress = get_u32(row, 5)?;
    Ok(Document {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?,
        content: row.get(3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        progress: u8::try_from(progress)
            .map_err(|_| DatabaseError::InvalidState(format!("document progress {progress}")))?,
        template_id: get_opt_string(row, 6)?,
        metadata: parse_optional_json(get_opt_string(row, 7)?.as_deref())?,
        framework_id: row.get(8)?,
        organization_id: row.get(9)?,
        created_by_id: row.get(10)?,
        collaborator_ids: Vec::new(),
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

fn check_progress(progress: u8) -> Result<(), DatabaseError> {
    if progress > 100 {
        return Err(DatabaseError::Validation(format!(
            "document progress must be 0-100, got {progress}"
        )));
    }
    Ok(())
}

impl ComplyService {
    /// Create a document, its initial version, and (if missing) the
    /// organization's progress row for the framework.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the framework, organization, author, or a
    ///   collaborator is missing.
    /// - `PartialFailure` if the document was stored but the initial version,
    ///   the progress row, or the audit entry could not be written.
    pub async fn create_document(
        &self,
        input: NewDocument,
        author_id: &str,
    ) -> Result<Document, DatabaseError> {
        if input.title.trim().is_empty() {
            return Err(DatabaseError::Validation("document title is empty".into()));
        }
        let progress = input.progress.unwrap_or(0);
        check_progress(progress)?;

        self.ensure_exists(EntityType::Framework, &input.framework_id)
            .await?;
        self.ensure_exists(EntityType::Organization, &input.organization_id)
            .await?;
        self.ensure_exists(EntityType::User, author_id).await?;
        for collaborator in &input.collaborator_ids {
            self.ensure_exists(EntityType::User, collaborator).await?;
        }

        let now = now();
        let id = self.db().generate_id(PREFIX_DOCUMENT).await?;
        let status = input.status.unwrap_or_default();
        let metadata = input.metadata.as_ref().map(ToString::to_string);
        let ts = format_datetime(&now);

        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO documents ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                ),
                || {
                    libsql::params![
                        id.as_str(),
                        input.title.as_str(),
                        input.description.as_deref(),
                        input.content.as_str(),
                        status.as_str(),
                        i64::from(progress),
                        input.template_id.as_deref(),
                        metadata.as_deref(),
                        input.framework_id.as_str(),
                        input.organization_id.as_str(),
                        author_id,
                        ts.as_str(),
                        ts.as_str()
                    ]
                },
            )
            .await?;

        for collaborator in &input.collaborator_ids {
            self.insert_collaborator(&id, collaborator).await?;
        }

        self.append_version(
            &id,
            &input.content,
            Some(INITIAL_CHANGE_LOG),
            input.metadata.as_ref(),
            author_id,
        )
        .await
        .map_err(|e| DatabaseError::partial(EntityType::Document, &id, SideEffect::VersionAppend, e))?;

        self.get_or_create_progress(&input.organization_id, &input.framework_id)
            .await
            .map_err(|e| DatabaseError::partial(EntityType::Document, &id, SideEffect::ProgressInit, e))?;

        self.record_committed(EntityType::Document, &id, AuditAction::Created, None)
            .await?;

        self.get_document(&id).await
    }

    /// `INSERT OR IGNORE`; returns whether a row was added.
    async fn insert_collaborator(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<bool, DatabaseError> {
        let ts = format_datetime(&now());
        let changed = self
            .db()
            .execute_with(
                "INSERT OR IGNORE INTO document_collaborators (document_id, user_id, added_at)
                 VALUES (?1, ?2, ?3)",
                || libsql::params![document_id, user_id, ts.as_str()],
            )
            .await?;
        Ok(changed > 0)
    }

    async fn collaborator_ids(&self, document_id: &str) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT user_id FROM document_collaborators WHERE document_id = ?1
                 ORDER BY added_at, rowid",
                || [document_id],
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    async fn collect_documents(&self, mut rows: libsql::Rows) -> Result<Vec<Document>, DatabaseError> {
        let mut docs = Vec::new();
        while let Some(row) = rows.next().await? {
            docs.push(row_to_document(&row)?);
        }
        for doc in &mut docs {
            doc.collaborator_ids = self.collaborator_ids(&doc.id).await?;
        }
        Ok(docs)
    }

    /// A document with its collaborator set.
    pub async fn get_document(&self, id: &str) -> Result<Document, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM documents WHERE id = ?1"),
                || [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Document, id))?;
        let mut doc = row_to_document(&row)?;
        doc.collaborator_ids = self.collaborator_ids(id).await?;
        Ok(doc)
    }

    /// Documents, most recently updated first, optionally filtered.
    pub async fn list_documents(
        &self,
        organization_id: Option<&str>,
        framework_id: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Document>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(org) = organization_id {
            params.push(libsql::Value::Text(org.to_string()));
            conditions.push(format!("organization_id = ?{}", params.len()));
        }
        if let Some(fw) = framework_id {
            params.push(libsql::Value::Text(fw.to_string()));
            conditions.push(format!("framework_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit_clause = limit.map(|l| format!("LIMIT {l}")).unwrap_or_default();

        let rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM documents {where_clause}
                     ORDER BY updated_at DESC, rowid DESC {limit_clause}"
                ),
                || libsql::params_from_iter(params.clone()),
            )
            .await?;
        self.collect_documents(rows).await
    }

    /// Full-text search over title, description, and content.
    pub async fn search_documents(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Document>, DatabaseError> {
        let rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS_D} FROM documents_fts
                     JOIN documents d ON d.rowid = documents_fts.rowid
                     WHERE documents_fts MATCH ?1
                     ORDER BY rank LIMIT ?2"
                ),
                || libsql::params![query, limit],
            )
            .await?;
        self.collect_documents(rows).await
    }

    /// Apply a whitelisted patch; append a version when the content changes.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the document or editor is missing.
    /// - `PartialFailure` if the document was updated but the version
    ///   append failed.
    pub async fn update_document(
        &self,
        id: &str,
        update: DocumentUpdate,
        editor_id: &str,
    ) -> Result<Document, DatabaseError> {
        let current = self.get_document(id).await?;
        self.ensure_exists(EntityType::User, editor_id).await?;
        if let Some(progress) = update.progress {
            check_progress(progress)?;
        }
        if matches!(update.title, Some(ref t) if t.trim().is_empty()) {
            return Err(DatabaseError::Validation("document title is empty".into()));
        }

        let mut detail = to_json_value(&update)?;
        if let Some(obj) = detail.as_object_mut()
            && obj.contains_key("content")
        {
            // Content lives in the version history, not the audit trail.
            obj.insert("content".into(), serde_json::Value::Bool(true));
        }
        let status_detail = update
            .status
            .filter(|status| *status != current.status)
            .map(|status| {
                to_json_value(&StatusChangedDetail {
                    from: current.status.as_str().to_string(),
                    to: status.as_str().to_string(),
                })
            })
            .transpose()?;

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref title) = update.title {
            sets.push(format!("title = ?{idx}"));
            params.push(title.clone().into());
            idx += 1;
        }
        if let Some(ref description) = update.description {
            sets.push(format!("description = ?{idx}"));
            params.push(opt_value(description.as_deref()));
            idx += 1;
        }
        if let Some(ref content) = update.content {
            sets.push(format!("content = ?{idx}"));
            params.push(content.clone().into());
            idx += 1;
        }
        if let Some(status) = update.status {
            sets.push(format!("status = ?{idx}"));
            params.push(status.as_str().into());
            idx += 1;
        }
        if let Some(progress) = update.progress {
            sets.push(format!("progress = ?{idx}"));
            params.push(libsql::Value::Integer(i64::from(progress)));
            idx += 1;
        }
        if let Some(ref template_id) = update.template_id {
            sets.push(format!("template_id = ?{idx}"));
            params.push(opt_value(template_id.as_deref()));
            idx += 1;
        }
        if let Some(ref metadata) = update.metadata {
            sets.push(format!("metadata = ?{idx}"));
            params.push(opt_value(metadata.as_ref().map(ToString::to_string).as_deref()));
            idx += 1;
        }

        if sets.is_empty() {
            return Ok(current);
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(format_datetime(&now()).into());
        idx += 1;

        params.push(libsql::Value::Text(id.to_string()));
        let sql = format!("UPDATE documents SET {} WHERE id = ?{idx}", sets.join(", "));
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        let updated = self.get_document(id).await?;

        if let Some(ref content) = update.content
            && *content != current.content
        {
            self.append_version(
                id,
                content,
                update.change_log.as_deref(),
                updated.metadata.as_ref(),
                editor_id,
            )
            .await
            .map_err(|e| DatabaseError::partial(EntityType::Document, id, SideEffect::VersionAppend, e))?;
        }

        self.record_committed(EntityType::Document, id, AuditAction::Updated, Some(detail))
            .await?;
        if status_detail.is_some() {
            self.record_committed(
                EntityType::Document,
                id,
                AuditAction::StatusChanged,
                status_detail,
            )
            .await?;
        }

        Ok(updated)
    }

    /// Hard delete; versions, comments, and collaborators go with it.
    pub async fn delete_document(&self, id: &str) -> Result<(), DatabaseError> {
        self.ensure_exists(EntityType::Document, id).await?;
        self.db()
            .execute_with("DELETE FROM documents WHERE id = ?1", || [id])
            .await?;
        self.record_committed(EntityType::Document, id, AuditAction::Deleted, None)
            .await
    }

    /// Add a collaborator. Adding an existing collaborator is a no-op.
    pub async fn add_collaborator(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<Document, DatabaseError> {
        self.ensure_exists(EntityType::Document, document_id).await?;
        self.ensure_exists(EntityType::User, user_id).await?;

        let changed = self.insert_collaborator(document_id, user_id).await?;
        self.record_committed_detail(
            EntityType::Document,
            document_id,
            AuditAction::CollaboratorAdded,
            &CollaboratorDetail {
                user_id: user_id.to_string(),
                changed,
            },
        )
        .await?;

        self.get_document(document_id).await
    }

    /// Remove a collaborator. Removing a non-collaborator is a no-op.
    pub async fn remove_collaborator(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<Document, DatabaseError> {
        self.ensure_exists(EntityType::Document, document_id).await?;

        let changed = self
            .db()
            .execute_with(
                "DELETE FROM document_collaborators WHERE document_id = ?1 AND user_id = ?2",
                || libsql::params![document_id, user_id],
            )
            .await?
            > 0;
        self.record_committed_detail(
            EntityType::Document,
            document_id,
            AuditAction::CollaboratorRemoved,
            &CollaboratorDetail {
                user_id: user_id.to_string(),
                changed,
            },
        )
        .await?;

        self.get_document(document_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{Fixture, extra_user, fixture, test_service};
    use crate::updates::document::DocumentUpdateBuilder;
    use comply_core::enums::FrameworkType;
    use pretty_assertions::assert_eq;

    fn new_doc(fx: &Fixture, title: &str, content: &str) -> NewDocument {
        NewDocument {
            title: title.into(),
            content: content.into(),
            framework_id: fx.framework.id.clone(),
            organization_id: fx.org.id.clone(),
            ..NewDocument::default()
        }
    }

    #[tokio::test]
    async fn create_appends_initial_version() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Gdpr).await;

        let doc = svc
            .create_document(new_doc(&fx, "Records of Processing", "<p>A</p>"), &fx.user.id)
            .await
            .unwrap();
        assert_eq!(doc.status, DocumentStatus::Draft);
        assert_eq!(doc.progress, 0);
        assert_eq!(doc.created_by_id, fx.user.id);

        let versions = svc.list_versions(&doc.id).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version, "1.0.0");
        assert_eq!(versions[0].change_log.as_deref(), Some(INITIAL_CHANGE_LOG));
        assert_eq!(versions[0].content, "<p>A</p>");
    }

    #[tokio::test]
    async fn create_initializes_progress_row() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Gdpr).await;
        let hipaa = svc.get_framework_by_type(FrameworkType::Hipaa).await.unwrap();

        svc.create_document(
            NewDocument {
                framework_id: hipaa.id.clone(),
                ..new_doc(&fx, "PHI Handling", "x")
            },
            &fx.user.id,
        )
        .await
        .unwrap();

        let row = svc
            .get_progress_by_framework(&fx.org.id, &hipaa.id)
            .await
            .unwrap();
        assert_eq!(row.total_tasks, 0);
    }

    #[tokio::test]
    async fn collaborators_are_deduplicated() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Gdpr).await;
        let bea = extra_user(&svc, &fx, "Bea Reviewer").await;

        let doc = svc
            .create_document(
                NewDocument {
                    collaborator_ids: vec![bea.id.clone(), bea.id.clone()],
                    ..new_doc(&fx, "Shared", "x")
                },
                &fx.user.id,
            )
            .await
            .unwrap();
        assert_eq!(doc.collaborator_ids, vec![bea.id.clone()]);

        let again = svc.add_collaborator(&doc.id, &bea.id).await.unwrap();
        assert_eq!(again.collaborator_ids, vec![bea.id.clone()]);

        let removed = svc.remove_collaborator(&doc.id, &bea.id).await.unwrap();
        assert!(removed.collaborator_ids.is_empty());
        let removed_again = svc.remove_collaborator(&doc.id, &bea.id).await.unwrap();
        assert!(removed_again.collaborator_ids.is_empty());
    }

    #[tokio::test]
    async fn unchanged_content_appends_nothing() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Gdpr).await;
        let doc = svc
            .create_document(new_doc(&fx, "Policy", "same"), &fx.user.id)
            .await
            .unwrap();

        let updated = svc
            .update_document(
                &doc.id,
                DocumentUpdateBuilder::new()
                    .content("same")
                    .status(DocumentStatus::InReview)
                    .progress(60)
                    .build(),
                &fx.user.id,
            )
            .await
            .unwrap();

        assert_eq!(updated.status, DocumentStatus::InReview);
        assert_eq!(updated.progress, 60);
        assert_eq!(svc.list_versions(&doc.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn content_change_carries_change_log() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Gdpr).await;
        let doc = svc
            .create_document(new_doc(&fx, "Policy", "A"), &fx.user.id)
            .await
            .unwrap();

        svc.update_document(
            &doc.id,
            DocumentUpdateBuilder::new()
                .content("B")
                .change_log("Clarified retention")
                .build(),
            &fx.user.id,
        )
        .await
        .unwrap();

        let latest = svc.latest_version(&doc.id).await.unwrap().unwrap();
        assert_eq!(latest.version, "1.0.1");
        assert_eq!(latest.content, "B");
        assert_eq!(latest.change_log.as_deref(), Some("Clarified retention"));
    }

    #[tokio::test]
    async fn progress_out_of_range_is_rejected() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Gdpr).await;
        let result = svc
            .create_document(
                NewDocument {
                    progress: Some(101),
                    ..new_doc(&fx, "Policy", "A")
                },
                &fx.user.id,
            )
            .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn create_requires_existing_references() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Gdpr).await;

        let bad_author = svc
            .create_document(new_doc(&fx, "Policy", "A"), "usr-missing")
            .await;
        assert!(matches!(
            bad_author,
            Err(DatabaseError::NotFound {
                entity: EntityType::User,
                ..
            })
        ));

        let bad_collaborator = svc
            .create_document(
                NewDocument {
                    collaborator_ids: vec!["usr-ghost".into()],
                    ..new_doc(&fx, "Policy", "A")
                },
                &fx.user.id,
            )
            .await;
        assert!(matches!(bad_collaborator, Err(DatabaseError::NotFound { .. })));
        assert!(svc.list_documents(None, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_filters_and_orders_by_recent_update() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Gdpr).await;
        let soc2 = svc.get_framework_by_type(FrameworkType::Soc2).await.unwrap();

        let a = svc
            .create_document(new_doc(&fx, "A", "a"), &fx.user.id)
            .await
            .unwrap();
        let b = svc
            .create_document(
                NewDocument {
                    framework_id: soc2.id.clone(),
                    ..new_doc(&fx, "B", "b")
                },
                &fx.user.id,
            )
            .await
            .unwrap();
        svc.update_document(&a.id, DocumentUpdateBuilder::new().title("A2").build(), &fx.user.id)
            .await
            .unwrap();

        let all: Vec<String> = svc
            .list_documents(Some(&fx.org.id), None, None)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(all, vec![a.id.clone(), b.id.clone()]);

        let soc2_docs = svc
            .list_documents(None, Some(&soc2.id), None)
            .await
            .unwrap();
        assert_eq!(soc2_docs.len(), 1);
        assert_eq!(soc2_docs[0].id, b.id);
    }

    #[tokio::test]
    async fn search_finds_by_content() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Gdpr).await;
        svc.create_document(
            new_doc(&fx, "Retention Policy", "Personal data is erased after 24 months"),
            &fx.user.id,
        )
        .await
        .unwrap();
        svc.create_document(new_doc(&fx, "Vendor List", "Processors"), &fx.user.id)
            .await
            .unwrap();

        let hits = svc.search_documents("erased", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Retention Policy");
    }

    #[tokio::test]
    async fn delete_cascades_history() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Gdpr).await;
        let doc = svc
            .create_document(new_doc(&fx, "Policy", "A"), &fx.user.id)
            .await
            .unwrap();

        svc.delete_document(&doc.id).await.unwrap();
        assert!(matches!(
            svc.get_document(&doc.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(svc.list_versions(&doc.id).await.unwrap().is_empty());
        assert!(matches!(
            svc.delete_document(&doc.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
