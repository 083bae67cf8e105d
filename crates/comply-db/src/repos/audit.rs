//! Audit trail repository.
//!
//! Append-only audit entries recording every mutation, attributed to the
//! acting identity when one is present.

use comply_core::entities::AuditEntry;
use comply_core::enums::{AuditAction, EntityType, SideEffect};
use comply_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_opt_string, now, parse_datetime, parse_enum, parse_optional_json,
    to_json_value,
};
use crate::service::ComplyService;

const SELECT_COLS: &str = "id, actor_id, entity_type, entity_id, action, detail, created_at";

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_id: Option<String>,
    pub limit: Option<u32>,
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get(0)?,
        actor_id: get_opt_string(row, 1)?,
        entity_type: parse_enum(&row.get::<String>(2)?)?,
        entity_id: row.get(3)?,
        action: parse_enum(&row.get::<String>(4)?)?,
        detail: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl ComplyService {
    /// Append an audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        let detail = entry.detail.as_ref().map(ToString::to_string);
        let created_at = format_datetime(&entry.created_at);
        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO audit_trail ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                || {
                    libsql::params![
                        entry.id.as_str(),
                        entry.actor_id.as_deref(),
                        entry.entity_type.as_str(),
                        entry.entity_id.as_str(),
                        entry.action.as_str(),
                        detail.as_deref(),
                        created_at.as_str()
                    ]
                },
            )
            .await?;
        Ok(())
    }

    /// Record a mutation by the current actor. Called by every mutation method.
    pub(crate) async fn record(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
    ) -> Result<AuditEntry, DatabaseError> {
        let entry = AuditEntry {
            id: self.db().generate_id(PREFIX_AUDIT).await?,
            actor_id: self.actor_id().map(String::from),
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail,
            created_at: now(),
        };
        self.append_audit(&entry).await?;
        Ok(entry)
    }

    /// Record a mutation whose primary write has already committed.
    ///
    /// A failed audit write is reported as `PartialFailure` with the
    /// `audit` effect, so callers never mistake it for a rejected write.
    pub(crate) async fn record_committed(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
    ) -> Result<(), DatabaseError> {
        self.record(entity_type, entity_id, action, detail)
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::partial(entity_type, entity_id, SideEffect::Audit, e))
    }

    /// [`Self::record_committed`] with a typed detail payload.
    pub(crate) async fn record_committed_detail<T: serde::Serialize + ?Sized>(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: &T,
    ) -> Result<(), DatabaseError> {
        let value = to_json_value(detail)
            .map_err(|e| DatabaseError::partial(entity_type, entity_id, SideEffect::Audit, e))?;
        self.record_committed(entity_type, entity_id, action, Some(value))
            .await
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(libsql::Value::Text(eid.clone()));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref actor) = filter.actor_id {
            params.push(libsql::Value::Text(actor.clone()));
            conditions.push(format!("actor_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{test_service, test_service_as};
    use comply_core::audit_detail::StatusChangedDetail;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn record_and_query_roundtrip() {
        let svc = test_service().await;
        let detail = serde_json::to_value(StatusChangedDetail {
            from: "pending".into(),
            to: "completed".into(),
        })
        .unwrap();

        let entry = svc
            .record(
                EntityType::Task,
                "tsk-00000001",
                AuditAction::StatusChanged,
                Some(detail),
            )
            .await
            .unwrap();

        let found = svc
            .query_audit(&AuditFilter {
                entity_id: Some("tsk-00000001".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found, vec![entry]);
    }

    #[tokio::test]
    async fn filters_combine() {
        let svc = test_service().await;
        svc.record(EntityType::Task, "tsk-1", AuditAction::Created, None)
            .await
            .unwrap();
        svc.record(EntityType::Task, "tsk-1", AuditAction::Updated, None)
            .await
            .unwrap();
        svc.record(EntityType::Document, "doc-1", AuditAction::Created, None)
            .await
            .unwrap();

        let created = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Created),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.len(), 2);

        let task_updates = svc
            .query_audit(&AuditFilter {
                entity_type: Some(EntityType::Task),
                action: Some(AuditAction::Updated),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(task_updates.len(), 1);
    }

    #[tokio::test]
    async fn newest_first_with_limit() {
        let svc = test_service().await;
        for i in 0..5 {
            svc.record(EntityType::Task, &format!("tsk-{i}"), AuditAction::Created, None)
                .await
                .unwrap();
        }
        let entries = svc
            .query_audit(&AuditFilter {
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entity_id, "tsk-4");
        assert_eq!(entries[1].entity_id, "tsk-3");
    }

    #[tokio::test]
    async fn actor_comes_from_identity() {
        let svc = test_service_as("usr-auditor1").await;
        let entry = svc
            .record(EntityType::Framework, "fwk-1", AuditAction::Updated, None)
            .await
            .unwrap();
        assert_eq!(entry.actor_id.as_deref(), Some("usr-auditor1"));

        let by_actor = svc
            .query_audit(&AuditFilter {
                actor_id: Some("usr-auditor1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_actor.len(), 1);
    }
}
