use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProgressCommands;
use crate::commands::framework::resolve;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply progress`.
pub async fn handle(
    action: &ProgressCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProgressCommands::List { org } => {
            let rows = ctx.service.get_progress(org).await?;
            output(&rows, flags.format)
        }
        ProgressCommands::Get { org, framework } => {
            let framework = resolve(ctx, framework).await?;
            let row = ctx
                .service
                .get_progress_by_framework(org, &framework.id)
                .await?;
            output(&row, flags.format)
        }
        ProgressCommands::Ensure { org, framework } => {
            let framework = resolve(ctx, framework).await?;
            let row = ctx
                .service
                .get_or_create_progress(org, &framework.id)
                .await?;
            output(&row, flags.format)
        }
        ProgressCommands::Recompute { id, org } => match (id, org) {
            (Some(id), _) => {
                let row = ctx.service.recompute_progress(id).await?;
                output(&row, flags.format)
            }
            (None, Some(org)) => {
                let rows = ctx.service.recompute_organization(org).await?;
                output(&rows, flags.format)
            }
            (None, None) => anyhow::bail!("pass --id or --org"),
        },
    }
}
