pub mod projects;
pub mod task_attachments;
pub mod task_comments;
pub mod task_history;
pub mod tasks;
pub mod users;
