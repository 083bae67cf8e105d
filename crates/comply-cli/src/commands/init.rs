use comply_core::catalog::FrameworkDefinition;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply init`.
///
/// Opening the context already created the schema; this seeds the catalog
/// and prints the frameworks now present.
pub async fn handle(args: &InitArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if ctx.config.general.seed_frameworks && !args.no_seed {
        let seeded = ctx
            .service
            .ensure_seeded(&FrameworkDefinition::builtin())
            .await?;
        tracing::info!(count = seeded.len(), "framework catalog seeded");
    }

    let frameworks = ctx.service.list_frameworks(true).await?;
    output(&frameworks, flags.format)
}
