use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};

use crate::{
    errors::AppError,
    repositories::image_store::{ImageStore, ImageUpload, StoredImage},
};

/// Object storage reached over HTTP: multipart `POST {base}` to store,
/// `DELETE {base}/{key}` to remove.
#[derive(Clone)]
pub struct HttpImageStore {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpImageStore {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload_image(&self, image: ImageUpload) -> Result<StoredImage, AppError> {
        let part = multipart::Part::bytes(image.data)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| AppError::InvalidInput(format!("Unsupported content type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .authorize(self.http_client.post(&self.base_url))
            .multipart(form)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(response.json::<StoredImage>().await?),
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(AppError::InternalError(format!(
                    "Image store rejected upload ({}): {}",
                    status, text
                )))
            }
        }
    }

    async fn delete_image(&self, key: &str) -> Result<(), AppError> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(key));
        let response = self.authorize(self.http_client.delete(&url)).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Already gone is as good as deleted
            StatusCode::NOT_FOUND => Ok(()),
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(AppError::InternalError(format!(
                    "Image store failed to delete {} ({}): {}",
                    key, status, text
                )))
            }
        }
    }
}
