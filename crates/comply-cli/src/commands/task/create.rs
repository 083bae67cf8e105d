use comply_core::enums::{TaskPriority, TaskStatus};
use comply_db::repos::task::NewTask;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{parse_date, parse_enum};
use crate::context::AppContext;
use crate::output::output;

pub struct Params {
    pub progress_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub requirements: Vec<String>,
    pub notes: Option<String>,
    pub assignee: Option<String>,
}

/// The task's framework is taken from its progress record.
pub async fn run(params: Params, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let progress = ctx.service.get_progress_by_id(&params.progress_id).await?;

    let input = NewTask {
        name: params.name,
        description: params.description,
        status: params
            .status
            .as_deref()
            .map(|value| parse_enum::<TaskStatus>(value, "status"))
            .transpose()?,
        priority: params
            .priority
            .as_deref()
            .map(|value| parse_enum::<TaskPriority>(value, "priority"))
            .transpose()?,
        due_date: params
            .due
            .as_deref()
            .map(|value| parse_date(value, "due"))
            .transpose()?,
        requirements: params.requirements,
        notes: params.notes,
        framework_id: progress.framework_id,
        compliance_progress_id: progress.id,
        assignee_id: params.assignee,
    };

    let task = ctx.service.create_task(input).await?;
    output(&task, flags.format)
}
