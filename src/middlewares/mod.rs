pub mod auth;
pub mod teacher;
