//! Concurrency and partial-failure behavior of the side effects that follow
//! a primary write.

use futures::future::join_all;
use pretty_assertions::assert_eq;

use comply_config::DatabaseConfig;
use comply_core::catalog::FrameworkDefinition;
use comply_core::enums::{EntityType, FrameworkType, SideEffect, TaskStatus};
use comply_core::progress::TaskCounts;
use comply_db::error::DatabaseError;
use comply_db::repos::document::NewDocument;
use comply_db::repos::task::NewTask;
use comply_db::service::ComplyService;
use comply_db::updates::document::DocumentUpdateBuilder;
use comply_db::updates::task::TaskUpdateBuilder;

async fn seeded(conflict_retries: u32) -> ComplyService {
    let config = DatabaseConfig {
        path: ":memory:".into(),
        conflict_retries,
    };
    let svc = ComplyService::open(&config, None).await.unwrap();
    svc.ensure_seeded(&FrameworkDefinition::builtin())
        .await
        .unwrap();
    svc
}

async fn exec(svc: &ComplyService, sql: &str) {
    svc.db().conn().execute_batch(sql).await.unwrap();
}

#[tokio::test]
async fn concurrent_get_or_create_yields_one_row() {
    let svc = seeded(8).await;
    let org = svc.create_organization("Racer Inc").await.unwrap();
    let fw = svc
        .get_framework_by_type(FrameworkType::Soc2)
        .await
        .unwrap();

    let results = join_all((0..6).map(|_| svc.get_or_create_progress(&org.id, &fw.id))).await;
    let ids: Vec<String> = results.into_iter().map(|r| r.unwrap().id).collect();
    assert!(ids.windows(2).all(|w| w[0] == w[1]));

    assert_eq!(svc.get_progress(&org.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_seeding_is_idempotent() {
    let svc = seeded(8).await;
    let builtin = FrameworkDefinition::builtin();
    let results = join_all((0..3).map(|_| svc.ensure_seeded(&builtin))).await;
    for r in results {
        assert_eq!(r.unwrap().len(), builtin.len());
    }
    assert_eq!(
        svc.list_frameworks(true).await.unwrap().len(),
        builtin.len()
    );
}

#[tokio::test]
async fn concurrent_edits_get_distinct_versions() {
    let svc = seeded(16).await;
    let org = svc.create_organization("Racer Inc").await.unwrap();
    let user = svc
        .create_user(&org.id, "ed@racer.test", "Ed Itor")
        .await
        .unwrap();
    let fw = svc
        .get_framework_by_type(FrameworkType::Gdpr)
        .await
        .unwrap();
    let doc = svc
        .create_document(
            NewDocument {
                title: "Notice".into(),
                content: "base".into(),
                framework_id: fw.id.clone(),
                organization_id: org.id.clone(),
                ..NewDocument::default()
            },
            &user.id,
        )
        .await
        .unwrap();

    let edits = (0..4).map(|i| {
        svc.update_document(
            &doc.id,
            DocumentUpdateBuilder::new().content(format!("edit {i}")).build(),
            &user.id,
        )
    });
    for r in join_all(edits).await {
        r.unwrap();
    }

    let mut labels: Vec<String> = svc
        .list_versions(&doc.id)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.version)
        .collect();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), 5);
}

#[tokio::test]
async fn failed_recompute_keeps_task_and_reports_partial() {
    let svc = seeded(4).await;
    let org = svc.create_organization("Fragile Co").await.unwrap();
    let fw = svc
        .get_framework_by_type(FrameworkType::Hipaa)
        .await
        .unwrap();
    let progress = svc.get_or_create_progress(&org.id, &fw.id).await.unwrap();

    exec(
        &svc,
        "CREATE TRIGGER block_recompute BEFORE UPDATE ON compliance_progress
         BEGIN SELECT RAISE(ABORT, 'recompute blocked'); END;",
    )
    .await;

    let result = svc
        .create_task(NewTask {
            name: "Encrypt PHI at rest".into(),
            status: Some(TaskStatus::Completed),
            framework_id: fw.id.clone(),
            compliance_progress_id: progress.id.clone(),
            ..NewTask::default()
        })
        .await;

    let task_id = match result {
        Err(DatabaseError::PartialFailure {
            entity: EntityType::Task,
            id,
            effect: SideEffect::ProgressRecompute,
            ..
        }) => id,
        other => panic!("expected partial failure, got {other:?}"),
    };
    assert_eq!(
        svc.get_task(&task_id).await.unwrap().status,
        TaskStatus::Completed
    );
    let stale = svc.get_progress_by_id(&progress.id).await.unwrap();
    assert_eq!(stale.total_tasks, 0);

    exec(&svc, "DROP TRIGGER block_recompute;").await;
    let healed = svc.recompute_progress(&progress.id).await.unwrap();
    assert_eq!((healed.total_tasks, healed.completed_tasks), (1, 1));
}

#[tokio::test]
async fn failed_version_append_keeps_document_update() {
    let svc = seeded(4).await;
    let org = svc.create_organization("Fragile Co").await.unwrap();
    let user = svc
        .create_user(&org.id, "writer@fragile.test", "Wren Writer")
        .await
        .unwrap();
    let fw = svc
        .get_framework_by_type(FrameworkType::Gdpr)
        .await
        .unwrap();
    let doc = svc
        .create_document(
            NewDocument {
                title: "Cookie Policy".into(),
                content: "v1".into(),
                framework_id: fw.id.clone(),
                organization_id: org.id.clone(),
                ..NewDocument::default()
            },
            &user.id,
        )
        .await
        .unwrap();

    exec(
        &svc,
        "CREATE TRIGGER block_versions BEFORE INSERT ON document_versions
         BEGIN SELECT RAISE(ABORT, 'versions blocked'); END;",
    )
    .await;

    let result = svc
        .update_document(
            &doc.id,
            DocumentUpdateBuilder::new().content("v2").build(),
            &user.id,
        )
        .await;
    assert!(matches!(
        result,
        Err(DatabaseError::PartialFailure {
            effect: SideEffect::VersionAppend,
            ..
        })
    ));

    assert_eq!(svc.get_document(&doc.id).await.unwrap().content, "v2");
    assert_eq!(svc.list_versions(&doc.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_progress_init_still_stores_document() {
    let svc = seeded(4).await;
    let org = svc.create_organization("Fragile Co").await.unwrap();
    let user = svc
        .create_user(&org.id, "writer@fragile.test", "Wren Writer")
        .await
        .unwrap();
    let fw = svc
        .get_framework_by_type(FrameworkType::PciDss)
        .await
        .unwrap();

    exec(
        &svc,
        "CREATE TRIGGER block_progress BEFORE INSERT ON compliance_progress
         BEGIN SELECT RAISE(ABORT, 'progress blocked'); END;",
    )
    .await;

    let result = svc
        .create_document(
            NewDocument {
                title: "Cardholder Data Flow".into(),
                content: "diagram".into(),
                framework_id: fw.id.clone(),
                organization_id: org.id.clone(),
                ..NewDocument::default()
            },
            &user.id,
        )
        .await;

    let doc_id = match result {
        Err(DatabaseError::PartialFailure {
            entity: EntityType::Document,
            id,
            effect: SideEffect::ProgressInit,
            ..
        }) => id,
        other => panic!("expected partial failure, got {other:?}"),
    };
    assert_eq!(svc.list_versions(&doc_id).await.unwrap().len(), 1);
    assert!(svc.get_progress(&org.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_status_updates_converge() {
    let svc = seeded(4).await;
    let org = svc.create_organization("Parallel Ltd").await.unwrap();
    let fw = svc
        .get_framework_by_type(FrameworkType::Soc2)
        .await
        .unwrap();
    let progress = svc.get_or_create_progress(&org.id, &fw.id).await.unwrap();

    let mut ids = Vec::new();
    for name in ["Access reviews", "Vendor inventory", "Incident runbook"] {
        let task = svc
            .create_task(NewTask {
                name: name.into(),
                framework_id: fw.id.clone(),
                compliance_progress_id: progress.id.clone(),
                ..NewTask::default()
            })
            .await
            .unwrap();
        ids.push(task.id);
    }

    let updates = [
        (&ids[0], TaskStatus::Completed),
        (&ids[1], TaskStatus::InProgress),
    ]
    .map(|(id, status)| svc.update_task(id, TaskUpdateBuilder::new().status(status).build()));
    for r in join_all(updates).await {
        r.unwrap();
    }

    let statuses = svc
        .list_tasks_for_progress(&progress.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.status);
    let stored = svc.get_progress_by_id(&progress.id).await.unwrap();
    assert_eq!(stored.counts(), TaskCounts::tally(statuses));
    assert_eq!(
        (stored.completed_tasks, stored.in_progress_tasks, stored.pending_tasks),
        (1, 1, 1)
    );
}

#[tokio::test]
async fn failed_task_audit_still_recomputes_and_reports_partial() {
    let svc = seeded(4).await;
    let org = svc.create_organization("Quiet Logs").await.unwrap();
    let fw = svc
        .get_framework_by_type(FrameworkType::Iso27001)
        .await
        .unwrap();
    let progress = svc.get_or_create_progress(&org.id, &fw.id).await.unwrap();
    let pending = svc
        .create_task(NewTask {
            name: "Asset register".into(),
            framework_id: fw.id.clone(),
            compliance_progress_id: progress.id.clone(),
            ..NewTask::default()
        })
        .await
        .unwrap();

    exec(
        &svc,
        "CREATE TRIGGER block_task_audit BEFORE INSERT ON audit_trail
         WHEN new.entity_type = 'task'
         BEGIN SELECT RAISE(ABORT, 'audit blocked'); END;",
    )
    .await;

    let created = svc
        .create_task(NewTask {
            name: "Statement of applicability".into(),
            status: Some(TaskStatus::Completed),
            framework_id: fw.id.clone(),
            compliance_progress_id: progress.id.clone(),
            ..NewTask::default()
        })
        .await;
    let task_id = match created {
        Err(DatabaseError::PartialFailure {
            entity: EntityType::Task,
            id,
            effect: SideEffect::Audit,
            ..
        }) => id,
        other => panic!("expected partial failure, got {other:?}"),
    };
    assert_eq!(
        svc.get_task(&task_id).await.unwrap().status,
        TaskStatus::Completed
    );
    let after_create = svc.get_progress_by_id(&progress.id).await.unwrap();
    assert_eq!((after_create.total_tasks, after_create.completed_tasks), (2, 1));

    let updated = svc
        .update_task(
            &pending.id,
            TaskUpdateBuilder::new().status(TaskStatus::Completed).build(),
        )
        .await;
    assert!(matches!(
        updated,
        Err(DatabaseError::PartialFailure {
            effect: SideEffect::Audit,
            ..
        })
    ));
    let after_update = svc.get_progress_by_id(&progress.id).await.unwrap();
    assert_eq!(after_update.completed_tasks, 2);
    assert!((after_update.percentage - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn failed_document_audit_keeps_new_version() {
    let svc = seeded(4).await;
    let org = svc.create_organization("Quiet Logs").await.unwrap();
    let user = svc
        .create_user(&org.id, "ops@quiet.test", "Olu Ops")
        .await
        .unwrap();
    let fw = svc
        .get_framework_by_type(FrameworkType::Gdpr)
        .await
        .unwrap();
    let doc = svc
        .create_document(
            NewDocument {
                title: "Retention Schedule".into(),
                content: "keep 7 years".into(),
                framework_id: fw.id.clone(),
                organization_id: org.id.clone(),
                ..NewDocument::default()
            },
            &user.id,
        )
        .await
        .unwrap();

    exec(
        &svc,
        "CREATE TRIGGER block_doc_update_audit BEFORE INSERT ON audit_trail
         WHEN new.entity_type = 'document' AND new.action = 'updated'
         BEGIN SELECT RAISE(ABORT, 'audit blocked'); END;",
    )
    .await;

    let result = svc
        .update_document(
            &doc.id,
            DocumentUpdateBuilder::new().content("keep 5 years").build(),
            &user.id,
        )
        .await;
    assert!(matches!(
        result,
        Err(DatabaseError::PartialFailure {
            entity: EntityType::Document,
            effect: SideEffect::Audit,
            ..
        })
    ));

    let versions = svc.list_versions(&doc.id).await.unwrap();
    assert_eq!(versions.len(), 2);
    assert!(versions.iter().any(|v| v.content == "keep 5 years"));
}
