pub mod attachment;
pub mod catalog;
pub mod comment;
pub mod group;
pub mod issue;
pub mod project;
pub mod screen;
pub mod user;
pub mod workflow;

pub use attachment::Attachment;
pub use catalog::{IssueType, Priority, Resolution, SecurityLevel, Status};
pub use comment::Comment;
pub use group::Group;
pub use issue::Issue;
pub use project::Project;
pub use screen::{LayoutItem, ScreenTab};
pub use user::User;
pub use workflow::Transition;
