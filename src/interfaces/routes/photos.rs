use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::{constants::MAX_UPLOAD_BYTES, handlers::photos};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/photos")
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(MAX_UPLOAD_BYTES + 64 * 1024)
                    .memory_limit(MAX_UPLOAD_BYTES + 64 * 1024)
            )
            .service(
                web::resource("")
                    .route(web::post().to(photos::create_photo))
            )
            .service(
                web::resource("/upload")
                    .route(web::post().to(photos::upload_photo))
            )
            .service(
                web::resource("/mine")
                    .route(web::get().to(photos::my_photos))
            )
            .service(
                web::resource("/map")
                    .route(web::get().to(photos::geotagged_photos))
            )
            .service(
                web::resource("/{photo_id}")
                    .route(web::get().to(photos::get_photo))
                    .route(web::delete().to(photos::delete_photo))
            )
    );
}
