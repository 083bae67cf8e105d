pub mod audit;
pub mod comment;
pub mod dashboard;
pub mod dispatch;
pub mod doc;
pub mod framework;
pub mod init;
pub mod org;
pub mod progress;
pub mod shared;
pub mod task;
pub mod user;
