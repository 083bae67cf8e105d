use crate::cli::GlobalFlags;
use crate::cli::subcommands::OrgCommands;
use crate::commands::shared::limit::{apply_limit, effective_limit};
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply org`.
pub async fn handle(action: &OrgCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        OrgCommands::Create { name } => {
            let org = ctx.service.create_organization(name).await?;
            output(&org, flags.format)
        }
        OrgCommands::Get { id } => {
            let org = ctx.service.get_organization(id).await?;
            output(&org, flags.format)
        }
        OrgCommands::List => {
            let mut orgs = ctx.service.list_organizations().await?;
            apply_limit(
                &mut orgs,
                effective_limit(flags.limit, ctx.config.general.default_limit),
            );
            output(&orgs, flags.format)
        }
    }
}
