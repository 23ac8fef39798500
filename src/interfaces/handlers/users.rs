use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{follow::DiscoverQuery, user::UpdateProfile},
    errors::AppError,
    use_cases::extractors::CurrentUser,
    utils::valid_uuid::valid_uuid,
    AppState,
};

#[instrument(skip(user, state), fields(user_id = %user.0.id))]
pub async fn me(
    user: CurrentUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let profile = state.profile_handler.me(&user.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[instrument(skip(user, state, data), fields(user_id = %user.0.id))]
pub async fn update_me(
    user: CurrentUser,
    state: web::Data<AppState>,
    data: web::Json<UpdateProfile>,
) -> Result<impl Responder, AppError> {
    let updated = state.profile_handler.update_profile(&user.0, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[instrument(skip(state))]
pub async fn get_profile(
    user_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user_id = valid_uuid(&user_id)?;
    let profile = state.profile_handler.get_profile(&user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[instrument(skip(state))]
pub async fn get_followers(
    user_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user_id = valid_uuid(&user_id)?;
    let followers = state.social_graph.list_followers(&user_id).await;
    Ok(HttpResponse::Ok().json(followers))
}

#[instrument(skip(state))]
pub async fn get_following(
    user_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user_id = valid_uuid(&user_id)?;
    let following = state.social_graph.list_following(&user_id).await;
    Ok(HttpResponse::Ok().json(following))
}

#[instrument(skip(state))]
pub async fn get_user_photos(
    user_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user_id = valid_uuid(&user_id)?;
    let photos = state.photo_handler.list_user_photos(&user_id).await?;
    Ok(HttpResponse::Ok().json(photos))
}

#[instrument(skip(user, state, query), fields(user_id = %user.0.id))]
pub async fn discover(
    user: CurrentUser,
    state: web::Data<AppState>,
    query: web::Query<DiscoverQuery>,
) -> Result<impl Responder, AppError> {
    let users = state.social_graph.discover(&user.0, query.limit).await;
    Ok(HttpResponse::Ok().json(users))
}
