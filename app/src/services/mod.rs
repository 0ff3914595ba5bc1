pub mod dashboard;
pub mod visibility;
