use clap::Subcommand;

/// Task commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TaskCommands {
    /// Create a task under a progress record.
    Create {
        #[arg(long)]
        progress: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Due date, YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
        /// Requirement reference; repeatable.
        #[arg(long)]
        requirement: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Update a task.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Due date, YYYY-MM-DD.
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, conflicts_with = "unassign")]
        assignee: Option<String>,
        #[arg(long)]
        unassign: bool,
        /// Move the task to another progress record of the same framework.
        #[arg(long)]
        progress: Option<String>,
    },
    /// Get a task by ID.
    Get { id: String },
    /// Delete a task.
    Delete { id: String },
    /// Tasks of a progress record, newest first.
    List {
        #[arg(long)]
        progress: String,
    },
    /// Open high and critical tasks of an organization.
    Priority {
        #[arg(long)]
        org: String,
    },
    /// Mark a task completed.
    Complete { id: String },
}
