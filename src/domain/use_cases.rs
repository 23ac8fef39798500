pub mod admin;
pub mod auth;
pub mod extractors;
pub mod geolocation;
pub mod photos;
pub mod profile;
pub mod social_graph;
