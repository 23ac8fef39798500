use actix_web::web;

use crate::handlers::locations;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/locations")
            .service(
                web::resource("/detect")
                    .route(web::post().to(locations::detect_location))
            )
    );
}
