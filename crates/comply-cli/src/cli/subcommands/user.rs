use clap::Subcommand;

/// User commands.
#[derive(Clone, Debug, Subcommand)]
pub enum UserCommands {
    /// Create a user in an organization.
    Create {
        #[arg(long)]
        org: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
    /// Get a user by ID.
    Get { id: String },
    /// List users of an organization.
    List {
        #[arg(long)]
        org: String,
    },
}
