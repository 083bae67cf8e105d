//! Task ledger repository.
//!
//! Tasks belong to exactly one framework and one compliance-progress record
//! of that same framework. Every write that can change the counters is
//! followed by a recompute of the affected record(s), then the audit entry.
//! A failure in either is reported as `PartialFailure` and never undoes the
//! task write.

use chrono::NaiveDate;

use comply_core::audit_detail::StatusChangedDetail;
use comply_core::entities::Task;
use comply_core::enums::{AuditAction, EntityType, SideEffect, TaskPriority, TaskStatus};
use comply_core::ids::PREFIX_TASK;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_opt_string, now, opt_value, parse_datetime, parse_enum,
    parse_optional_date, parse_optional_datetime, parse_string_list, to_json, to_json_value,
};
use crate::service::ComplyService;
use crate::updates::task::TaskUpdate;

const SELECT_COLS: &str = "id, name, description, status, priority, due_date, completed_at, \
     requirements, notes, framework_id, compliance_progress_id, assignee_id, created_at, updated_at";

const SELECT_COLS_T: &str = "t.id, t.name, t.description, t.status, t.priority, t.due_date, \
     t.completed_at, t.requirements, t.notes, t.framework_id, t.compliance_progress_id, \
     t.assignee_id, t.created_at, t.updated_at";

/// Size of the dashboard priority list.
pub const PRIORITY_LIST_LIMIT: u32 = 10;

/// Input for [`ComplyService::create_task`].
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `pending`.
    pub status: Option<TaskStatus>,
    /// Defaults to `medium`.
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub requirements: Vec<String>,
    pub notes: Option<String>,
    pub framework_id: String,
    pub compliance_progress_id: String,
    pub assignee_id: Option<String>,
}

fn row_to_task(row: &libsql::Row) -> Result<Task, DatabaseError> {
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        priority: parse_enum(&row.get::<String>(4)?)?,
        due_date: parse_optional_date(get_opt_string(row, 5)?.as_deref())?,
        completed_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        requirements: parse_string_list(&row.get::<String>(7)?)?,
        notes: get_opt_string(row, 8)?,
        framework_id: row.get(9)?,
        compliance_progress_id: row.get(10)?,
        assignee_id: get_opt_string(row, 11)?,
        created_at: parse_datetime(&row.get::<String>(12)?)?,
        updated_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

async fn collect_tasks(mut rows: libsql::Rows) -> Result<Vec<Task>, DatabaseError> {
    let mut tasks = Vec::new();
    while let Some(row) = rows.next().await? {
        tasks.push(row_to_task(&row)?);
    }
    Ok(tasks)
}

impl ComplyService {
    /// Recompute `progress_id` after a committed write to `task_id`.
    async fn recompute_after_task_write(
        &self,
        task_id: &str,
        progress_id: &str,
    ) -> Result<(), DatabaseError> {
        self.recompute_progress(progress_id).await.map_err(|e| {
            DatabaseError::partial(EntityType::Task, task_id, SideEffect::ProgressRecompute, e)
        })?;
        Ok(())
    }

    /// Create a task and recompute its progress record.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the framework, progress record, or assignee is missing.
    /// - `InvalidReference` if the progress record tracks another framework.
    /// - `PartialFailure` if the task was stored but the recompute or audit failed.
    pub async fn create_task(&self, input: NewTask) -> Result<Task, DatabaseError> {
        if input.name.trim().is_empty() {
            return Err(DatabaseError::Validation("task name is empty".into()));
        }
        self.ensure_exists(EntityType::Framework, &input.framework_id)
            .await?;
        let progress = self
            .get_progress_by_id(&input.compliance_progress_id)
            .await?;
        if progress.framework_id != input.framework_id {
            return Err(DatabaseError::InvalidReference(format!(
                "task framework {} does not match progress {} (framework {})",
                input.framework_id, progress.id, progress.framework_id
            )));
        }
        if let Some(ref assignee) = input.assignee_id {
            self.ensure_exists(EntityType::User, assignee).await?;
        }

        let now = now();
        let id = self.db().generate_id(PREFIX_TASK).await?;
        let status = input.status.unwrap_or_default();
        let priority = input.priority.unwrap_or_default();
        let completed_at = (status == TaskStatus::Completed).then_some(now);

        let ts = format_datetime(&now);
        let due = input.due_date.map(format_date);
        let completed = completed_at.as_ref().map(format_datetime);
        let requirements = to_json(&input.requirements)?;

        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO tasks ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
                ),
                || {
                    libsql::params![
                        id.as_str(),
                        input.name.as_str(),
                        input.description.as_deref(),
                        status.as_str(),
                        priority.as_str(),
                        due.as_deref(),
                        completed.as_deref(),
                        requirements.as_str(),
                        input.notes.as_deref(),
                        input.framework_id.as_str(),
                        input.compliance_progress_id.as_str(),
                        input.assignee_id.as_deref(),
                        ts.as_str(),
                        ts.as_str()
                    ]
                },
            )
            .await?;

        let task = Task {
            id,
            name: input.name,
            description: input.description,
            status,
            priority,
            due_date: input.due_date,
            completed_at,
            requirements: input.requirements,
            notes: input.notes,
            framework_id: input.framework_id,
            compliance_progress_id: input.compliance_progress_id,
            assignee_id: input.assignee_id,
            created_at: now,
            updated_at: now,
        };

        self.recompute_after_task_write(&task.id, &task.compliance_progress_id)
            .await?;
        self.record_committed(EntityType::Task, &task.id, AuditAction::Created, None)
            .await?;
        Ok(task)
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM tasks WHERE id = ?1"),
                || [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Task, id))?;
        row_to_task(&row)
    }

    /// Apply a whitelisted patch.
    ///
    /// Entering `completed` from any other status stamps `completed_at`; a
    /// task that is already completed keeps its original stamp. The progress
    /// record is recomputed when the status changes, and both records are
    /// recomputed when the task moves to another record.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the task, target progress record, or assignee is missing.
    /// - `InvalidReference` if the target record tracks another framework.
    /// - `PartialFailure` if the task was updated but a recompute or audit failed.
    pub async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Task, DatabaseError> {
        let current = self.get_task(task_id).await?;

        let moved_to = match update.compliance_progress_id {
            Some(ref target_id) if *target_id != current.compliance_progress_id => {
                let target = self.get_progress_by_id(target_id).await?;
                if target.framework_id != current.framework_id {
                    return Err(DatabaseError::InvalidReference(format!(
                        "task {task_id} tracks framework {}, progress {} tracks {}",
                        current.framework_id, target.id, target.framework_id
                    )));
                }
                Some(target.id)
            }
            _ => None,
        };
        if let Some(Some(ref assignee)) = update.assignee_id {
            self.ensure_exists(EntityType::User, assignee).await?;
        }
        if matches!(update.name, Some(ref n) if n.trim().is_empty()) {
            return Err(DatabaseError::Validation("task name is empty".into()));
        }

        let status_changed = update.status.is_some_and(|s| s != current.status);
        let update_detail = to_json_value(&update)?;
        let status_detail = update
            .status
            .filter(|_| status_changed)
            .map(|to| {
                to_json_value(&StatusChangedDetail {
                    from: current.status.as_str().to_string(),
                    to: to.as_str().to_string(),
                })
            })
            .transpose()?;

        let now = now();
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref name) = update.name {
            sets.push(format!("name = ?{idx}"));
            params.push(name.clone().into());
            idx += 1;
        }
        if let Some(ref description) = update.description {
            sets.push(format!("description = ?{idx}"));
            params.push(opt_value(description.as_deref()));
            idx += 1;
        }
        if let Some(status) = update.status {
            sets.push(format!("status = ?{idx}"));
            params.push(status.as_str().into());
            idx += 1;
            if current.status.enters_completed(status) {
                sets.push(format!("completed_at = ?{idx}"));
                params.push(format_datetime(&now).into());
                idx += 1;
            }
        }
        if let Some(priority) = update.priority {
            sets.push(format!("priority = ?{idx}"));
            params.push(priority.as_str().into());
            idx += 1;
        }
        if let Some(due_date) = update.due_date {
            sets.push(format!("due_date = ?{idx}"));
            params.push(opt_value(due_date.map(format_date).as_deref()));
            idx += 1;
        }
        if let Some(ref requirements) = update.requirements {
            sets.push(format!("requirements = ?{idx}"));
            params.push(to_json(requirements)?.into());
            idx += 1;
        }
        if let Some(ref notes) = update.notes {
            sets.push(format!("notes = ?{idx}"));
            params.push(opt_value(notes.as_deref()));
            idx += 1;
        }
        if let Some(ref assignee_id) = update.assignee_id {
            sets.push(format!("assignee_id = ?{idx}"));
            params.push(opt_value(assignee_id.as_deref()));
            idx += 1;
        }
        if let Some(ref target) = moved_to {
            sets.push(format!("compliance_progress_id = ?{idx}"));
            params.push(target.clone().into());
            idx += 1;
        }

        if sets.is_empty() {
            return Ok(current);
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(format_datetime(&now).into());
        idx += 1;

        params.push(task_id.into());
        let sql = format!("UPDATE tasks SET {} WHERE id = ?{idx}", sets.join(", "));
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        if status_changed || moved_to.is_some() {
            self.recompute_after_task_write(task_id, &current.compliance_progress_id)
                .await?;
        }
        if let Some(ref target) = moved_to {
            self.recompute_after_task_write(task_id, target).await?;
        }

        self.record_committed(
            EntityType::Task,
            task_id,
            AuditAction::Updated,
            Some(update_detail),
        )
        .await?;
        if status_detail.is_some() {
            self.record_committed(
                EntityType::Task,
                task_id,
                AuditAction::StatusChanged,
                status_detail,
            )
            .await?;
        }

        self.get_task(task_id).await
    }

    /// Delete a task and recompute the record it counted toward.
    pub async fn delete_task(&self, task_id: &str) -> Result<(), DatabaseError> {
        let current = self.get_task(task_id).await?;

        self.db()
            .execute_with("DELETE FROM tasks WHERE id = ?1", || [task_id])
            .await?;
        self.recompute_after_task_write(task_id, &current.compliance_progress_id)
            .await?;
        self.record_committed(EntityType::Task, task_id, AuditAction::Deleted, None)
            .await
    }

    /// Tasks of one progress record, newest first.
    pub async fn list_tasks_for_progress(
        &self,
        progress_id: &str,
    ) -> Result<Vec<Task>, DatabaseError> {
        let rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM tasks WHERE compliance_progress_id = ?1
                     ORDER BY created_at DESC, rowid DESC"
                ),
                || [progress_id],
            )
            .await?;
        collect_tasks(rows).await
    }

    /// Open high and critical tasks of the organization, earliest due date
    /// first, undated tasks last, ties in creation order.
    pub async fn list_priority_tasks(
        &self,
        organization_id: &str,
    ) -> Result<Vec<Task>, DatabaseError> {
        let mut params: Vec<libsql::Value> = vec![
            organization_id.into(),
            TaskStatus::Completed.as_str().into(),
        ];
        let mut placeholders = Vec::new();
        for priority in TaskPriority::ALL.into_iter().filter(|p| p.is_urgent()) {
            params.push(priority.as_str().into());
            placeholders.push(format!("?{}", params.len()));
        }

        let sql = format!(
            "SELECT {SELECT_COLS_T} FROM tasks t
             JOIN compliance_progress p ON p.id = t.compliance_progress_id
             WHERE p.organization_id = ?1
               AND t.status != ?2
               AND t.priority IN ({})
             ORDER BY t.due_date IS NULL, t.due_date ASC, t.created_at ASC, t.rowid ASC
             LIMIT {PRIORITY_LIST_LIMIT}",
            placeholders.join(", ")
        );
        let rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        collect_tasks(rows).await
    }
}
