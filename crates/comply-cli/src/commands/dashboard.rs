use crate::cli::GlobalFlags;
use crate::cli::root_commands::DashboardArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply dashboard`.
pub async fn handle(
    args: &DashboardArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let dashboard = ctx.service.dashboard(&args.org).await?;
    output(&dashboard, flags.format)
}
