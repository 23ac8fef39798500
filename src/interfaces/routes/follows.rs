use actix_web::web;

use crate::handlers::follows;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/follow")
            .service(
                web::resource("")
                    .route(web::post().to(follows::follow))
                    .route(web::delete().to(follows::unfollow))
            )
            .service(
                web::resource("/status")
                    .route(web::get().to(follows::follow_status))
            )
    );
}
