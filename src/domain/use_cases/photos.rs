use std::sync::Arc;

use uuid::Uuid;

use crate::{
    access::AccessPolicy,
    entities::{
        photo::{NewPhotoRequest, Photo, PhotoMetadata},
        token::Principal,
    },
    errors::AppError,
    repositories::{
        image_store::{ImageStore, ImageUpload},
        photo::PhotoRepository,
    },
};

/// An uploaded binary plus the metadata that came with it.
#[derive(Debug)]
pub struct PhotoUpload {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub metadata: PhotoMetadata,
}

#[derive(Clone)]
pub struct PhotoHandler {
    photo_repo: Arc<dyn PhotoRepository>,
    image_store: Arc<dyn ImageStore>,
    policy: AccessPolicy,
}

impl PhotoHandler {
    pub fn new(
        photo_repo: Arc<dyn PhotoRepository>,
        image_store: Arc<dyn ImageStore>,
        policy: AccessPolicy,
    ) -> Self {
        PhotoHandler { photo_repo, image_store, policy }
    }

    /// Records a photo whose binary is already stored elsewhere.
    pub async fn create_photo(&self, owner: &Principal, request: NewPhotoRequest) -> Result<Photo, AppError> {
        let insert = request.prepare_for_insert(owner.id)?;
        let photo = self.photo_repo.create_photo(&insert).await?;
        tracing::info!(photo_id = %photo.id, owner = %owner.id, "Photo created");
        Ok(photo)
    }

    /// Stores the binary, then the record. A failed record removes the stored binary again.
    pub async fn upload_photo(&self, owner: &Principal, upload: PhotoUpload) -> Result<Photo, AppError> {
        let content_type = infer::get(&upload.data)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .map(|kind| kind.mime_type().to_string())
            .ok_or_else(|| AppError::InvalidInput("File is not a recognised image".into()))?;

        let file_name = upload
            .file_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let stored = self.image_store
            .upload_image(ImageUpload { data: upload.data, file_name, content_type })
            .await?;

        let insert = upload.metadata.into_insert(owner.id, stored.url.clone());
        match self.photo_repo.create_photo(&insert).await {
            Ok(photo) => {
                tracing::info!(photo_id = %photo.id, owner = %owner.id, "Photo uploaded");
                Ok(photo)
            }
            Err(e) => {
                if let Err(cleanup) = self.image_store.delete_image(&stored.key).await {
                    tracing::error!(key = %stored.key, "Orphaned image after failed photo insert: {}", cleanup);
                }
                Err(e)
            }
        }
    }

    pub async fn get_photo(&self, id: &Uuid) -> Result<Photo, AppError> {
        self.photo_repo
            .get_photo_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Photo not found".into()))
    }

    /// Owner-only hard delete.
    pub async fn delete_photo(&self, actor: &Principal, id: &Uuid) -> Result<(), AppError> {
        let photo = self.get_photo(id).await?;
        self.policy.ensure_owner(actor, &photo.user_id)?;

        if !self.photo_repo.delete_photo(id).await? {
            return Err(AppError::NotFound("Photo not found".into()));
        }
        tracing::info!(photo_id = %id, owner = %actor.id, "Photo deleted");
        Ok(())
    }

    pub async fn list_own_photos(&self, owner: &Principal) -> Result<Vec<Photo>, AppError> {
        self.photo_repo.list_photos_by_owner(&owner.id).await
    }

    pub async fn list_user_photos(&self, user_id: &Uuid) -> Result<Vec<Photo>, AppError> {
        self.photo_repo.list_photos_by_owner(user_id).await
    }

    /// Map feed: only photos carrying both coordinates.
    pub async fn list_geotagged_photos(&self) -> Result<Vec<Photo>, AppError> {
        let photos = self.photo_repo.list_geotagged_photos().await?;
        Ok(photos.into_iter().filter(Photo::is_geotagged).collect())
    }
}
