use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::geolocation::{DetectLocationRequest, DetectLocationResponse},
    errors::AppError,
    use_cases::extractors::CurrentUser,
    AppState,
};

#[instrument(skip(user, state, data), fields(user_id = %user.0.id))]
pub async fn detect_location(
    user: CurrentUser,
    state: web::Data<AppState>,
    data: web::Json<DetectLocationRequest>,
) -> Result<impl Responder, AppError> {
    let candidates = state.location_handler.detect(&user.0, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DetectLocationResponse { candidates }))
}
