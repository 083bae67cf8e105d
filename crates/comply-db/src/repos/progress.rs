//! Compliance progress repository.
//!
//! One row per (organization, framework) pair, created lazily through a
//! find-or-create guarded by the `UNIQUE (organization_id, framework_id)`
//! constraint. Counters are refreshed by a full re-scan of the task set,
//! never by deltas, so concurrent recomputes converge.

use comply_core::audit_detail::RecomputedDetail;
use comply_core::entities::ComplianceProgress;
use comply_core::enums::{AuditAction, EntityType, TaskStatus};
use comply_core::ids::PREFIX_PROGRESS;
use comply_core::progress::TaskCounts;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_u32, now, parse_datetime, parse_enum};
use crate::retry::find_or_create;
use crate::service::ComplyService;

const SELECT_COLS: &str = "id, organization_id, framework_id, total_tasks, completed_tasks, \
     in_progress_tasks, pending_tasks, percentage, created_at, updated_at";

fn row_to_progress(row: &libsql::Row) -> Result<ComplianceProgress, DatabaseError> {
    Ok(ComplianceProgress {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        framework_id: row.get(2)?,
        total_tasks: get_u32(row, 3)?,
        completed_tasks: get_u32(row, 4)?,
        in_progress_tasks: get_u32(row, 5)?,
        pending_tasks: get_u32(row, 6)?,
        percentage: row.get::<f64>(7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

/// Replace the stored percentage with the one derived from the counters.
fn with_fresh_percentage(mut progress: ComplianceProgress) -> ComplianceProgress {
    progress.percentage = progress.counts().percentage();
    progress
}

impl ComplyService {
    /// Find the progress row for the pair, or create it with zero counters.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the organization or framework is
    /// missing, `DatabaseError::ConflictOnCreate` if the insert keeps racing
    /// past the retry budget.
    pub async fn get_or_create_progress(
        &self,
        organization_id: &str,
        framework_id: &str,
    ) -> Result<ComplianceProgress, DatabaseError> {
        self.ensure_exists(EntityType::Organization, organization_id)
            .await?;
        self.ensure_exists(EntityType::Framework, framework_id)
            .await?;

        let key = format!("{organization_id}/{framework_id}");
        let attempts = self.conflict_attempts();
        find_or_create(
            &key,
            attempts,
            || self.find_progress(organization_id, framework_id),
            || self.insert_progress(organization_id, framework_id),
        )
        .await?
        .ok_or(DatabaseError::ConflictOnCreate {
            entity: EntityType::ComplianceProgress,
            key,
            attempts,
        })
    }

    async fn insert_progress(
        &self,
        organization_id: &str,
        framework_id: &str,
    ) -> Result<ComplianceProgress, DatabaseError> {
        let now = now();
        let id = self.db().generate_id(PREFIX_PROGRESS).await?;
        let ts = format_datetime(&now);

        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO compliance_progress ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, 0, 0, 0, 0, 0, ?4, ?5)"
                ),
                || {
                    libsql::params![
                        id.as_str(),
                        organization_id,
                        framework_id,
                        ts.as_str(),
                        ts.as_str()
                    ]
                },
            )
            .await?;

        self.record_committed(EntityType::ComplianceProgress, &id, AuditAction::Created, None)
            .await?;

        Ok(ComplianceProgress {
            id,
            organization_id: organization_id.to_string(),
            framework_id: framework_id.to_string(),
            total_tasks: 0,
            completed_tasks: 0,
            in_progress_tasks: 0,
            pending_tasks: 0,
            percentage: 0.0,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_progress(
        &self,
        organization_id: &str,
        framework_id: &str,
    ) -> Result<Option<ComplianceProgress>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM compliance_progress
                     WHERE organization_id = ?1 AND framework_id = ?2"
                ),
                || libsql::params![organization_id, framework_id],
            )
            .await?;
        rows.next()
            .await?
            .map(|row| row_to_progress(&row).map(with_fresh_percentage))
            .transpose()
    }

    pub async fn get_progress_by_id(&self, id: &str) -> Result<ComplianceProgress, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM compliance_progress WHERE id = ?1"),
                || [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::ComplianceProgress, id))?;
        row_to_progress(&row).map(with_fresh_percentage)
    }

    /// Every progress row of the organization, percentages derived from the
    /// stored counters without re-scanning tasks.
    pub async fn get_progress(
        &self,
        organization_id: &str,
    ) -> Result<Vec<ComplianceProgress>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM compliance_progress
                     WHERE organization_id = ?1 ORDER BY rowid"
                ),
                || [organization_id],
            )
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(with_fresh_percentage(row_to_progress(&row)?));
        }
        Ok(records)
    }

    pub async fn get_progress_by_framework(
        &self,
        organization_id: &str,
        framework_id: &str,
    ) -> Result<ComplianceProgress, DatabaseError> {
        self.find_progress(organization_id, framework_id)
            .await?
            .ok_or_else(|| {
                DatabaseError::not_found(
                    EntityType::ComplianceProgress,
                    format!("{organization_id}/{framework_id}"),
                )
            })
    }

    /// Re-tally every task of the record and persist counters and percentage.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the record is missing.
    pub async fn recompute_progress(
        &self,
        progress_id: &str,
    ) -> Result<ComplianceProgress, DatabaseError> {
        self.ensure_exists(EntityType::ComplianceProgress, progress_id)
            .await?;

        let mut rows = self
            .db()
            .query_with(
                "SELECT status FROM tasks WHERE compliance_progress_id = ?1",
                || [progress_id],
            )
            .await?;
        let mut statuses = Vec::new();
        while let Some(row) = rows.next().await? {
            statuses.push(parse_enum::<TaskStatus>(&row.get::<String>(0)?)?);
        }

        let counts = TaskCounts::tally(statuses);
        let percentage = counts.percentage();
        let ts = format_datetime(&now());

        self.db()
            .execute_with(
                "UPDATE compliance_progress
                 SET total_tasks = ?1, completed_tasks = ?2, in_progress_tasks = ?3,
                     pending_tasks = ?4, percentage = ?5, updated_at = ?6
                 WHERE id = ?7",
                || {
                    libsql::params![
                        counts.total,
                        counts.completed,
                        counts.in_progress,
                        counts.pending,
                        percentage,
                        ts.as_str(),
                        progress_id
                    ]
                },
            )
            .await?;

        tracing::debug!(
            progress_id,
            total = counts.total,
            completed = counts.completed,
            percentage,
            "progress recomputed"
        );

        self.record_committed_detail(
            EntityType::ComplianceProgress,
            progress_id,
            AuditAction::Recomputed,
            &RecomputedDetail { counts, percentage },
        )
        .await?;

        self.get_progress_by_id(progress_id).await
    }

    /// Recompute every progress record of the organization.
    pub async fn recompute_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<ComplianceProgress>, DatabaseError> {
        self.ensure_exists(EntityType::Organization, organization_id)
            .await?;
        let ids: Vec<String> = self
            .get_progress(organization_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let mut refreshed = Vec::with_capacity(ids.len());
        for id in ids {
            refreshed.push(self.recompute_progress(&id).await?);
        }
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{fixture, test_service};
    use comply_core::enums::FrameworkType;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn get_or_create_starts_at_zero_and_is_stable() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Soc2).await;

        assert_eq!(fx.progress.counts(), TaskCounts::default());
        assert!(fx.progress.percentage.abs() < f64::EPSILON);

        let again = svc
            .get_or_create_progress(&fx.org.id, &fx.framework.id)
            .await
            .unwrap();
        assert_eq!(again.id, fx.progress.id);
        assert_eq!(svc.get_progress(&fx.org.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_or_create_requires_references() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Gdpr).await;

        let missing_org = svc
            .get_or_create_progress("org-missing", &fx.framework.id)
            .await;
        assert!(matches!(
            missing_org,
            Err(DatabaseError::NotFound {
                entity: EntityType::Organization,
                ..
            })
        ));

        let missing_fw = svc.get_or_create_progress(&fx.org.id, "fwk-missing").await;
        assert!(matches!(
            missing_fw,
            Err(DatabaseError::NotFound {
                entity: EntityType::Framework,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn lookup_by_framework() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Iso27001).await;

        let found = svc
            .get_progress_by_framework(&fx.org.id, &fx.framework.id)
            .await
            .unwrap();
        assert_eq!(found.id, fx.progress.id);

        let pci = svc.get_framework_by_type(FrameworkType::PciDss).await.unwrap();
        let absent = svc.get_progress_by_framework(&fx.org.id, &pci.id).await;
        assert!(matches!(absent, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn percentage_is_derived_from_stored_counters() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Soc2).await;

        // Counters edited out-of-band with a stale percentage.
        svc.db()
            .conn()
            .execute(
                "UPDATE compliance_progress SET total_tasks = 3, completed_tasks = 1, pending_tasks = 2, percentage = 99 WHERE id = ?1",
                [fx.progress.id.as_str()],
            )
            .await
            .unwrap();

        let rows = svc.get_progress(&fx.org.id).await.unwrap();
        assert!((rows[0].percentage - 33.33).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn recompute_heals_stale_counters() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Soc2).await;

        svc.db()
            .conn()
            .execute(
                "UPDATE compliance_progress SET total_tasks = 9, completed_tasks = 9 WHERE id = ?1",
                [fx.progress.id.as_str()],
            )
            .await
            .unwrap();

        let healed = svc.recompute_organization(&fx.org.id).await.unwrap();
        assert_eq!(healed.len(), 1);
        assert_eq!(healed[0].counts(), TaskCounts::default());
    }

    #[tokio::test]
    async fn recompute_missing_record_is_not_found() {
        let svc = test_service().await;
        let result = svc.recompute_progress("prg-missing").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
