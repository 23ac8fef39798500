use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, use_cases::extractors::AdminUser, utils::valid_uuid::valid_uuid, AppState};

#[instrument(skip(admin, state))]
pub async fn list_users(
    admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let users = state.admin_handler.list_users(&admin.0).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[instrument(skip(admin, state))]
pub async fn delete_user(
    admin: AdminUser,
    user_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user_id = valid_uuid(&user_id)?;
    state.admin_handler.delete_user(&admin.0, &user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
