use clap::Subcommand;

/// Organization commands.
#[derive(Clone, Debug, Subcommand)]
pub enum OrgCommands {
    /// Create an organization.
    Create {
        #[arg(long)]
        name: String,
    },
    /// Get an organization by ID.
    Get { id: String },
    /// List organizations.
    List,
}
