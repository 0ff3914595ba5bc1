pub mod project;
pub mod project_member;
pub mod task;
pub mod task_attachment;
pub mod task_comment;
pub mod task_history;
pub mod user;
