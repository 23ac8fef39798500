pub mod admin;
pub mod auth;
pub mod follows;
pub mod home;
pub mod locations;
pub mod photos;
pub mod system;
pub mod users;
