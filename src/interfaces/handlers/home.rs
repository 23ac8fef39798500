use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

use crate::constants::API_PREFIX;

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "service": "photomap",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "resources": {
            "auth": format!("{API_PREFIX}/auth"),
            "users": format!("{API_PREFIX}/users"),
            "follow": format!("{API_PREFIX}/follow"),
            "photos": format!("{API_PREFIX}/photos"),
            "map": format!("{API_PREFIX}/photos/map"),
            "locations": format!("{API_PREFIX}/locations/detect"),
        }
    }))
}
