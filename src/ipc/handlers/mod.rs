pub mod auth;
pub mod classes;
pub mod core;
pub mod dashboard;
pub mod students;
