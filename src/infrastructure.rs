pub mod auth;
pub mod db;
pub mod geo;
pub mod limiter;
pub mod storage;
pub mod utils;
