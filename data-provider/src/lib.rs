pub mod entity;
pub mod models;
pub mod provider;
pub mod repository;

/// Backing file for [`models::Post`] records.
pub const POSTS_FILE: &str = "posts.json";
/// Backing file for [`models::User`] records.
pub const USERS_FILE: &str = "users.json";
