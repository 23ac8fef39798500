use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::follow::{FollowRequest, FollowStatus, FollowTargetQuery},
    errors::AppError,
    use_cases::extractors::CurrentUser,
    AppState,
};

#[instrument(skip(user, state, data), fields(user_id = %user.0.id))]
pub async fn follow(
    user: CurrentUser,
    state: web::Data<AppState>,
    data: web::Json<FollowRequest>,
) -> Result<impl Responder, AppError> {
    let follow = state.social_graph.follow(&user.0, &data.target_user_id).await?;
    Ok(HttpResponse::Created().json(follow))
}

#[instrument(skip(user, state, query), fields(user_id = %user.0.id))]
pub async fn unfollow(
    user: CurrentUser,
    state: web::Data<AppState>,
    query: web::Query<FollowTargetQuery>,
) -> Result<impl Responder, AppError> {
    state.social_graph.unfollow(&user.0, &query.target_user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Unfollowed successfully" })))
}

#[instrument(skip(user, state, query), fields(user_id = %user.0.id))]
pub async fn follow_status(
    user: CurrentUser,
    state: web::Data<AppState>,
    query: web::Query<FollowTargetQuery>,
) -> Result<impl Responder, AppError> {
    let is_following = state.social_graph.is_following(&user.0, &query.target_user_id).await;
    Ok(HttpResponse::Ok().json(FollowStatus {
        target_user_id: query.target_user_id,
        is_following,
    }))
}
