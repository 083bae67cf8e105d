//! Shared test utilities for comply-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use comply_core::catalog::FrameworkDefinition;
    use comply_core::entities::{ComplianceProgress, Framework, Organization, User};
    use comply_core::enums::FrameworkType;
    use comply_core::identity::AuthIdentity;

    use crate::ComplyDb;
    use crate::service::ComplyService;

    /// In-memory service with no acting identity.
    pub async fn test_service() -> ComplyService {
        let db = ComplyDb::open_local(":memory:").await.unwrap();
        ComplyService::from_db(db, None)
    }

    /// In-memory service acting as `user_id`.
    pub async fn test_service_as(user_id: &str) -> ComplyService {
        let db = ComplyDb::open_local(":memory:").await.unwrap();
        ComplyService::from_db(db, Some(AuthIdentity::new(user_id, None)))
    }

    /// Everything a task or document needs to point at.
    pub struct Fixture {
        pub org: Organization,
        pub user: User,
        pub framework: Framework,
        pub progress: ComplianceProgress,
    }

    /// Seed the built-in catalog and create one org, one user, and the
    /// progress row for `framework_type`.
    pub async fn fixture(svc: &ComplyService, framework_type: FrameworkType) -> Fixture {
        svc.ensure_seeded(&FrameworkDefinition::builtin())
            .await
            .unwrap();
        let org = svc.create_organization("Acme Corp").await.unwrap();
        let user = svc
            .create_user(&org.id, "owner@acme.test", "Olive Owner")
            .await
            .unwrap();
        let framework = svc.get_framework_by_type(framework_type).await.unwrap();
        let progress = svc.get_or_create_progress(&org.id, &framework.id).await.unwrap();
        Fixture {
            org,
            user,
            framework,
            progress,
        }
    }

    /// Create a second user in the fixture's organization.
    pub async fn extra_user(svc: &ComplyService, fx: &Fixture, name: &str) -> User {
        let email = format!("{}@acme.test", name.to_lowercase().replace(' ', "."));
        svc.create_user(&fx.org.id, &email, name).await.unwrap()
    }
}
