use crate::cli::GlobalFlags;
use crate::cli::subcommands::UserCommands;
use crate::commands::shared::limit::{apply_limit, effective_limit};
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply user`.
pub async fn handle(action: &UserCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        UserCommands::Create { org, email, name } => {
            let user = ctx.service.create_user(org, email, name).await?;
            output(&user, flags.format)
        }
        UserCommands::Get { id } => {
            let user = ctx.service.get_user(id).await?;
            output(&user, flags.format)
        }
        UserCommands::List { org } => {
            let mut users = ctx.service.list_users(org).await?;
            apply_limit(
                &mut users,
                effective_limit(flags.limit, ctx.config.general.default_limit),
            );
            output(&users, flags.format)
        }
    }
}
