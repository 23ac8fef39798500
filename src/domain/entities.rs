pub mod follow;
pub mod geolocation;
pub mod photo;
pub mod token;
pub mod user;
