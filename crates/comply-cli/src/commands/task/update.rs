use comply_core::enums::{TaskPriority, TaskStatus};
use comply_db::updates::task::TaskUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{parse_date, parse_enum};
use crate::context::AppContext;
use crate::output::output;

pub struct Params {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub notes: Option<String>,
    pub assignee: Option<String>,
    pub unassign: bool,
    pub progress: Option<String>,
}

pub async fn run(params: Params, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    validate_update_params(&params)?;

    let mut builder = TaskUpdateBuilder::new();
    if let Some(name) = params.name.as_deref() {
        builder = builder.name(name);
    }
    if let Some(description) = params.description {
        builder = builder.description(Some(description));
    }
    if let Some(status) = params.status.as_deref() {
        builder = builder.status(parse_enum::<TaskStatus>(status, "status")?);
    }
    if let Some(priority) = params.priority.as_deref() {
        builder = builder.priority(parse_enum::<TaskPriority>(priority, "priority")?);
    }
    if let Some(due) = params.due.as_deref() {
        builder = builder.due_date(Some(parse_date(due, "due")?));
    } else if params.clear_due {
        builder = builder.due_date(None);
    }
    if let Some(notes) = params.notes {
        builder = builder.notes(Some(notes));
    }
    if let Some(assignee) = params.assignee {
        builder = builder.assignee_id(Some(assignee));
    } else if params.unassign {
        builder = builder.assignee_id(None);
    }
    if let Some(progress) = params.progress {
        builder = builder.compliance_progress_id(progress);
    }

    let task = ctx.service.update_task(&params.id, builder.build()).await?;
    output(&task, flags.format)
}

fn validate_update_params(params: &Params) -> anyhow::Result<()> {
    if params.name.is_none()
        && params.description.is_none()
        && params.status.is_none()
        && params.priority.is_none()
        && params.due.is_none()
        && !params.clear_due
        && params.notes.is_none()
        && params.assignee.is_none()
        && !params.unassign
        && params.progress.is_none()
    {
        anyhow::bail!("Nothing to update: pass at least one field flag");
    }
    Ok(())
}
