//! Organization dashboard: progress per framework, an overall completion
//! figure, the priority list, and the most recently touched documents.

use comply_core::enums::EntityType;
use comply_core::progress::completion_percentage;
use comply_core::responses::DashboardResponse;

use crate::error::DatabaseError;
use crate::service::ComplyService;

/// Number of documents shown under "recent documents".
pub const RECENT_DOCUMENTS_LIMIT: u32 = 5;

impl ComplyService {
    /// Assemble the dashboard for an organization.
    ///
    /// The overall percentage weighs every framework by its task count.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the organization is missing.
    pub async fn dashboard(&self, organization_id: &str) -> Result<DashboardResponse, DatabaseError> {
        self.ensure_exists(EntityType::Organization, organization_id)
            .await?;

        let progress = self.get_progress(organization_id).await?;
        let (completed, total) = progress.iter().fold((0u32, 0u32), |(c, t), p| {
            (c + p.completed_tasks, t + p.total_tasks)
        });
        let priority_tasks = self.list_priority_tasks(organization_id).await?;
        let recent_documents = self
            .list_documents(Some(organization_id), None, Some(RECENT_DOCUMENTS_LIMIT))
            .await?;

        Ok(DashboardResponse {
            organization_id: organization_id.to_string(),
            progress,
            overall_percentage: completion_percentage(completed, total),
            priority_tasks,
            recent_documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::document::NewDocument;
    use crate::repos::task::NewTask;
    use crate::test_support::helpers::{fixture, test_service};
    use comply_core::enums::{FrameworkType, TaskPriority, TaskStatus};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn empty_organization() {
        let svc = test_service().await;
        let org = svc.create_organization("Empty Ltd").await.unwrap();

        let dash = svc.dashboard(&org.id).await.unwrap();
        assert!(dash.progress.is_empty());
        assert_eq!(dash.overall_percentage, 0.0);
        assert!(dash.priority_tasks.is_empty());
        assert!(dash.recent_documents.is_empty());
    }

    #[tokio::test]
    async fn overall_weighs_by_task_count() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Soc2).await;
        let gdpr = svc.get_framework_by_type(FrameworkType::Gdpr).await.unwrap();
        let gdpr_progress = svc.get_or_create_progress(&fx.org.id, &gdpr.id).await.unwrap();

        svc.create_task(NewTask {
            name: "Risk Assessment".into(),
            status: Some(TaskStatus::Completed),
            framework_id: fx.framework.id.clone(),
            compliance_progress_id: fx.progress.id.clone(),
            ..NewTask::default()
        })
        .await
        .unwrap();
        for name in ["DPIA", "ROPA", "DPO appointment"] {
            svc.create_task(NewTask {
                name: name.into(),
                priority: Some(TaskPriority::High),
                framework_id: gdpr.id.clone(),
                compliance_progress_id: gdpr_progress.id.clone(),
                ..NewTask::default()
            })
            .await
            .unwrap();
        }

        let dash = svc.dashboard(&fx.org.id).await.unwrap();
        assert_eq!(dash.progress.len(), 2);
        assert_eq!(dash.overall_percentage, 25.0);
        assert_eq!(dash.priority_tasks.len(), 3);
    }

    #[tokio::test]
    async fn recent_documents_are_capped() {
        let svc = test_service().await;
        let fx = fixture(&svc, FrameworkType::Iso27001).await;
        for i in 0..7 {
            svc.create_document(
                NewDocument {
                    title: format!("Policy {i}"),
                    content: "x".into(),
                    framework_id: fx.framework.id.clone(),
                    organization_id: fx.org.id.clone(),
                    ..NewDocument::default()
                },
                &fx.user.id,
            )
            .await
            .unwrap();
        }

        let dash = svc.dashboard(&fx.org.id).await.unwrap();
        assert_eq!(dash.recent_documents.len(), RECENT_DOCUMENTS_LIMIT as usize);
        assert_eq!(dash.recent_documents[0].title, "Policy 6");
    }

    #[tokio::test]
    async fn unknown_organization() {
        let svc = test_service().await;
        assert!(matches!(
            svc.dashboard("org-missing").await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
