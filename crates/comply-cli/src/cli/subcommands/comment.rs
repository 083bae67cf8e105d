use clap::Subcommand;

/// Comment commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CommentCommands {
    /// Comment on a document as the acting user.
    Add {
        #[arg(long)]
        doc: String,
        #[arg(long)]
        content: String,
        /// Reply to this comment.
        #[arg(long)]
        parent: Option<String>,
        /// Selection start offset.
        #[arg(long, requires_all = ["end", "text"])]
        start: Option<u32>,
        #[arg(long, requires_all = ["start", "text"])]
        end: Option<u32>,
        /// Selected text.
        #[arg(long, requires_all = ["start", "end"])]
        text: Option<String>,
    },
    /// Top-level comments of a document with their replies.
    List {
        #[arg(long)]
        doc: String,
    },
    /// Direct replies to a comment.
    Replies { id: String },
    /// Toggle the resolved flag.
    Resolve { id: String },
}
