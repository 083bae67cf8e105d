#[path = "task/create.rs"]
mod create;
#[path = "task/update.rs"]
mod update;

use comply_core::enums::TaskStatus;
use comply_db::updates::task::TaskUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TaskCommands;
use crate::commands::shared::limit::{apply_limit, effective_limit};
use crate::context::AppContext;
use crate::output::{Deleted, output};

/// Handle `comply task`.
pub async fn handle(action: &TaskCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        TaskCommands::Create {
            progress,
            name,
            description,
            status,
            priority,
            due,
            requirement,
            notes,
            assignee,
        } => {
            create::run(
                create::Params {
                    progress_id: progress.clone(),
                    name: name.clone(),
                    description: description.clone(),
                    status: status.clone(),
                    priority: priority.clone(),
                    due: due.clone(),
                    requirements: requirement.clone(),
                    notes: notes.clone(),
                    assignee: assignee.clone(),
                },
                ctx,
                flags,
            )
            .await
        }
        TaskCommands::Update {
            id,
            name,
            description,
            status,
            priority,
            due,
            clear_due,
            notes,
            assignee,
            unassign,
            progress,
        } => {
            update::run(
                update::Params {
                    id: id.clone(),
                    name: name.clone(),
                    description: description.clone(),
                    status: status.clone(),
                    priority: priority.clone(),
                    due: due.clone(),
                    clear_due: *clear_due,
                    notes: notes.clone(),
                    assignee: assignee.clone(),
                    unassign: *unassign,
                    progress: progress.clone(),
                },
                ctx,
                flags,
            )
            .await
        }
        TaskCommands::Get { id } => {
            let task = ctx.service.get_task(id).await?;
            output(&task, flags.format)
        }
        TaskCommands::Delete { id } => {
            ctx.service.delete_task(id).await?;
            output(&Deleted { id, deleted: true }, flags.format)
        }
        TaskCommands::List { progress } => {
            let mut tasks = ctx.service.list_tasks_for_progress(progress).await?;
            apply_limit(
                &mut tasks,
                effective_limit(flags.limit, ctx.config.general.default_limit),
            );
            output(&tasks, flags.format)
        }
        TaskCommands::Priority { org } => {
            let tasks = ctx.service.list_priority_tasks(org).await?;
            output(&tasks, flags.format)
        }
        TaskCommands::Complete { id } => {
            let task = ctx
                .service
                .update_task(id, TaskUpdateBuilder::new().status(TaskStatus::Completed).build())
                .await?;
            output(&task, flags.format)
        }
    }
}
