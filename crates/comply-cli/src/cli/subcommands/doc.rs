use clap::Subcommand;

/// Document commands.
#[derive(Clone, Debug, Subcommand)]
pub enum DocCommands {
    /// Create a document; the acting user is the author.
    Create {
        #[arg(long)]
        org: String,
        #[arg(long)]
        framework: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,
        /// Read content from a file.
        #[arg(long)]
        content_file: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        template: Option<String>,
        /// Collaborator user ID; repeatable.
        #[arg(long)]
        collaborator: Vec<String>,
    },
    /// Update a document; content changes append a version.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,
        #[arg(long)]
        content_file: Option<String>,
        /// Change log for the appended version.
        #[arg(long)]
        change_log: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        progress: Option<u8>,
    },
    /// Get a document by ID.
    Get { id: String },
    /// Delete a document with its versions and comments.
    Delete { id: String },
    /// List documents, most recently updated first.
    List {
        #[arg(long)]
        org: Option<String>,
        #[arg(long)]
        framework: Option<String>,
    },
    /// Full-text search over title, description, and content.
    Search { query: String },
    /// Version history of a document, oldest first.
    Versions { id: String },
    /// Get one version by its ID.
    Version { id: String },
    /// Add a collaborator.
    AddCollaborator { id: String, user_id: String },
    /// Remove a collaborator.
    RemoveCollaborator { id: String, user_id: String },
}
