use clap::Subcommand;

/// Compliance progress commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProgressCommands {
    /// Progress rows of an organization.
    List {
        #[arg(long)]
        org: String,
    },
    /// Progress of an organization for one framework.
    Get {
        #[arg(long)]
        org: String,
        #[arg(long)]
        framework: String,
    },
    /// Find or create the progress row for an organization and framework.
    Ensure {
        #[arg(long)]
        org: String,
        #[arg(long)]
        framework: String,
    },
    /// Re-tally counters from tasks, for one row or a whole organization.
    Recompute {
        #[arg(long, conflicts_with = "org", required_unless_present = "org")]
        id: Option<String>,
        #[arg(long)]
        org: Option<String>,
    },
}
