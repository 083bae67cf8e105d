use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    CommentCommands, DocCommands, FrameworkCommands, OrgCommands, ProgressCommands, TaskCommands,
    UserCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the database and seed the built-in framework catalog.
    Init(InitArgs),
    /// Organizations.
    Org {
        #[command(subcommand)]
        action: OrgCommands,
    },
    /// Users.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Framework catalog.
    Framework {
        #[command(subcommand)]
        action: FrameworkCommands,
    },
    /// Compliance progress per organization and framework.
    Progress {
        #[command(subcommand)]
        action: ProgressCommands,
    },
    /// Compliance tasks.
    Task {
        #[command(subcommand)]
        action: TaskCommands,
    },
    /// Documents, versions, and collaborators.
    Doc {
        #[command(subcommand)]
        action: DocCommands,
    },
    /// Document comments.
    Comment {
        #[command(subcommand)]
        action: CommentCommands,
    },
    /// View audit trail.
    Audit(AuditArgs),
    /// Organization overview.
    Dashboard(DashboardArgs),
}

/// Arguments for `comply init`.
#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Skip seeding even when configuration enables it.
    #[arg(long)]
    pub no_seed: bool,
}

/// Arguments for `comply audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    #[arg(long)]
    pub actor: Option<String>,
}

/// Arguments for `comply dashboard`.
#[derive(Clone, Debug, Args)]
pub struct DashboardArgs {
    #[arg(long)]
    pub org: String,
}
