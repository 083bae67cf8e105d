mod comment;
mod doc;
mod framework;
mod org;
mod progress;
mod task;
mod user;

pub use comment::CommentCommands;
pub use doc::DocCommands;
pub use framework::FrameworkCommands;
pub use org::OrgCommands;
pub use progress::ProgressCommands;
pub use task::TaskCommands;
pub use user::UserCommands;
