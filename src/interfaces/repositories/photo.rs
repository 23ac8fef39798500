use async_trait::async_trait;
use uuid::Uuid;
use sqlx::PgPool;

use crate::{
    entities::photo::{Photo, PhotoInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxPhotoRepo,
};

const PHOTO_COLUMNS: &str = "id, user_id, title, image_url, location, latitude, longitude, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    async fn create_photo(&self, photo: &PhotoInsert) -> Result<Photo, AppError>;
    async fn get_photo_by_id(&self, id: &Uuid) -> Result<Option<Photo>, AppError>;
    /// Returns whether a row was removed.
    async fn delete_photo(&self, id: &Uuid) -> Result<bool, AppError>;
    async fn list_photos_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Photo>, AppError>;
    async fn list_geotagged_photos(&self) -> Result<Vec<Photo>, AppError>;
}

impl SqlxPhotoRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxPhotoRepo { pool }
    }
}

#[async_trait]
impl PhotoRepository for SqlxPhotoRepo {
    async fn create_photo(&self, photo: &PhotoInsert) -> Result<Photo, AppError> {
        let created = sqlx::query_as::<_, Photo>(&format!(
            r#"
            INSERT INTO photos (user_id, title, image_url, location, latitude, longitude, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PHOTO_COLUMNS}
            "#
        ))
        .bind(photo.user_id)
        .bind(&photo.title)
        .bind(&photo.image_url)
        .bind(&photo.location)
        .bind(photo.latitude)
        .bind(photo.longitude)
        .bind(photo.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_photo_by_id(&self, id: &Uuid) -> Result<Option<Photo>, AppError> {
        let photo = sqlx::query_as::<_, Photo>(&format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(photo)
    }

    async fn delete_photo(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_photos_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    async fn list_geotagged_photos(&self) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as::<_, Photo>(&format!(
            r#"
            SELECT {PHOTO_COLUMNS} FROM photos
            WHERE latitude IS NOT NULL AND longitude IS NOT NULL
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }
}
