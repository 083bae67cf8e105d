use clap::Subcommand;

/// Framework catalog commands.
#[derive(Clone, Debug, Subcommand)]
pub enum FrameworkCommands {
    /// List frameworks (active only unless --all).
    List {
        #[arg(long)]
        all: bool,
    },
    /// Get a framework by ID or type name (e.g. SOC2, PCI-DSS).
    Get { key: String },
    /// Insert any missing built-in frameworks.
    Seed,
    /// Edit framework metadata.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        requirements: Option<String>,
        /// Comma-separated category labels.
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<String>>,
        #[arg(long, conflicts_with = "deactivate")]
        activate: bool,
        #[arg(long)]
        deactivate: bool,
    },
}
