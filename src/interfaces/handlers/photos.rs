use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::photo::{NewPhotoRequest, PhotoCreatedResponse, PhotoUploadForm},
    errors::AppError,
    use_cases::{extractors::CurrentUser, photos::PhotoUpload},
    utils::valid_uuid::valid_uuid,
    AppState,
};

#[instrument(skip(user, state, data), fields(user_id = %user.0.id))]
pub async fn create_photo(
    user: CurrentUser,
    state: web::Data<AppState>,
    data: web::Json<NewPhotoRequest>,
) -> Result<impl Responder, AppError> {
    let photo = state.photo_handler.create_photo(&user.0, data.into_inner()).await?;
    Ok(HttpResponse::Created().json(PhotoCreatedResponse {
        id: photo.id,
        image_url: photo.image_url,
        message: "Photo created successfully".to_string(),
    }))
}

#[instrument(skip(user, state, form), fields(user_id = %user.0.id))]
pub async fn upload_photo(
    user: CurrentUser,
    state: web::Data<AppState>,
    form: MultipartForm<PhotoUploadForm>,
) -> Result<impl Responder, AppError> {
    let form = form.into_inner();
    let metadata = form.metadata()?;

    let upload = PhotoUpload {
        data: form.file.data.to_vec(),
        file_name: form.file.file_name,
        metadata,
    };

    let photo = state.photo_handler.upload_photo(&user.0, upload).await?;
    Ok(HttpResponse::Created().json(PhotoCreatedResponse {
        id: photo.id,
        image_url: photo.image_url,
        message: "Photo uploaded successfully".to_string(),
    }))
}

#[instrument(skip(user, state), fields(user_id = %user.0.id))]
pub async fn my_photos(
    user: CurrentUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let photos = state.photo_handler.list_own_photos(&user.0).await?;
    Ok(HttpResponse::Ok().json(photos))
}

#[instrument(skip(state))]
pub async fn geotagged_photos(
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let photos = state.photo_handler.list_geotagged_photos().await?;
    Ok(HttpResponse::Ok().json(photos))
}

#[instrument(skip(state))]
pub async fn get_photo(
    photo_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let photo_id = valid_uuid(&photo_id)?;
    let photo = state.photo_handler.get_photo(&photo_id).await?;
    Ok(HttpResponse::Ok().json(photo))
}

#[instrument(skip(user, state), fields(user_id = %user.0.id))]
pub async fn delete_photo(
    user: CurrentUser,
    photo_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let photo_id = valid_uuid(&photo_id)?;
    state.photo_handler.delete_photo(&user.0, &photo_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
