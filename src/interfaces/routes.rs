use actix_web::web;

use crate::{
    constants::API_PREFIX,
    handlers::{home::home, system::health_check},
};

mod admin;
mod auth;
mod follows;
mod json_error;
mod locations;
mod photos;
mod users;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(health_check);

    cfg.service(
        web::scope(API_PREFIX)
            .configure(auth::config_routes)
            .configure(admin::config_routes)
            .configure(users::config_routes)
            .configure(follows::config_routes)
            .configure(photos::config_routes)
            .configure(locations::config_routes)
    );

    cfg.configure(json_error::config_routes);
}
