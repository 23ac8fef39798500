use std::{sync::Arc, time::Duration};

use crate::{
    errors::AppError,
    geo::classifier_client::GeoClassifierClient,
    repositories::{
        follow::FollowRepository,
        geolocation::GeoLocator,
        image_store::ImageStore,
        photo::PhotoRepository,
        sqlx_repo::{SqlxFollowRepo, SqlxPhotoRepo, SqlxUserRepo},
        token::TokenServiceRepository,
        user::UserRepository,
    },
    auth::jwt::JwtService,
    settings::AppConfig,
    storage::http_image_store::HttpImageStore,
};

/// Every collaborator the use cases talk to, as trait objects.
#[derive(Clone)]
pub struct SharedRepositories {
    pub user_repo: Arc<dyn UserRepository>,
    pub follow_repo: Arc<dyn FollowRepository>,
    pub photo_repo: Arc<dyn PhotoRepository>,
    pub token_service: Arc<dyn TokenServiceRepository>,
    pub image_store: Arc<dyn ImageStore>,
    pub geo_locator: Option<Arc<dyn GeoLocator>>,
}

impl SharedRepositories {
    /// Postgres-backed repositories plus the HTTP clients for storage and geolocation.
    pub fn new(config: &AppConfig, pool: sqlx::PgPool) -> Result<Self, AppError> {
        let image_store = HttpImageStore::new(&config.image_store_url, config.image_store_api_key.clone())?;

        let geo_locator: Option<Arc<dyn GeoLocator>> = match config.geo_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(Arc::new(GeoClassifierClient::new(
                &config.geo_api_url,
                key.to_string(),
                Duration::from_secs(config.geo_timeout_secs),
            )?)),
            _ => {
                tracing::warn!("GEO_API_KEY not set, location detection is disabled");
                None
            }
        };

        Ok(SharedRepositories {
            user_repo: Arc::new(SqlxUserRepo::new(pool.clone())),
            follow_repo: Arc::new(SqlxFollowRepo::new(pool.clone())),
            photo_repo: Arc::new(SqlxPhotoRepo::new(pool)),
            token_service: Arc::new(JwtService::new(config)),
            image_store: Arc::new(image_store),
            geo_locator,
        })
    }
}
