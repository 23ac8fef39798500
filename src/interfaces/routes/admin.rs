use actix_web::web;

use crate::handlers::admin;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(
                web::resource("/users")
                    .route(web::get().to(admin::list_users))
            )
            .service(
                web::resource("/users/{user_id}")
                    .route(web::delete().to(admin::delete_user))
            )
    );
}
