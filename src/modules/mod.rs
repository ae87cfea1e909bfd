pub mod healthcheck;
pub mod members;
pub mod notes;
pub mod projects;
pub mod subtasks;
pub mod tasks;
pub mod users;
