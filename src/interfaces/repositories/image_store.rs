use async_trait::async_trait;

use crate::errors::AppError;

/// Binary handed to the object store.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// Where the object store put it. `key` is what `delete_image` expects back.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct StoredImage {
    pub url: String,
    pub key: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload_image(&self, image: ImageUpload) -> Result<StoredImage, AppError>;
    async fn delete_image(&self, key: &str) -> Result<(), AppError>;
}
