use async_trait::async_trait;

use crate::{
    entities::geolocation::{ImageSource, LocationCandidate},
    errors::AppError,
};

/// Image geolocation classifier. Implementations return candidates in any order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn locate(&self, image: &ImageSource, top_k: u8) -> Result<Vec<LocationCandidate>, AppError>;
}
