pub mod comments;
pub mod dashboard;
pub mod projects;
pub mod tasks;
