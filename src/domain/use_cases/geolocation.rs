use std::{sync::Arc, time::Duration};

use validator::Validate;

use crate::{
    entities::{
        geolocation::{DetectLocationRequest, ImageSource, LocationCandidate},
        token::Principal,
    },
    errors::AppError,
    limiter::rate_limiter::RateLimiterStore,
    repositories::geolocation::GeoLocator,
};

/// Suggests coordinates for a photo through the external classifier.
#[derive(Clone)]
pub struct LocationHandler {
    locator: Option<Arc<dyn GeoLocator>>,
    limiter: RateLimiterStore,
    top_k: u8,
    min_confidence: f64,
    timeout: Duration,
}

impl LocationHandler {
    pub fn new(
        locator: Option<Arc<dyn GeoLocator>>,
        limiter: RateLimiterStore,
        top_k: u8,
        min_confidence: f64,
        timeout: Duration,
    ) -> Self {
        LocationHandler {
            locator,
            limiter,
            top_k: top_k.max(1),
            min_confidence,
            timeout,
        }
    }

    pub fn limiter(&self) -> &RateLimiterStore {
        &self.limiter
    }

    pub async fn detect(
        &self,
        actor: &Principal,
        request: DetectLocationRequest,
    ) -> Result<Vec<LocationCandidate>, AppError> {
        let source = image_source(request)?;

        // Only well-formed requests spend quota
        self.limiter.check(&actor.id.to_string())?;

        let locator = self.locator.as_ref().ok_or_else(|| {
            AppError::InternalError("location detection is not configured".into())
        })?;

        let mut candidates = tokio::time::timeout(self.timeout, locator.locate(&source, self.top_k))
            .await
            .map_err(|_| AppError::InternalError("Geolocation service timed out".into()))??;

        candidates.retain(|c| c.confidence >= self.min_confidence);
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        if candidates.is_empty() {
            return Err(AppError::NotFound("No location could be detected for this image".into()));
        }

        tracing::info!(user = %actor.id, candidates = candidates.len(), "Location detected");
        Ok(candidates)
    }
}

/// Exactly one of `imageUrl` / `imageBase64`. Data URL prefixes are stripped.
fn image_source(request: DetectLocationRequest) -> Result<ImageSource, AppError> {
    request.validate()?;

    let url = request.image_url.filter(|u| !u.trim().is_empty());
    let data = request.image_base64.filter(|d| !d.trim().is_empty());

    match (url, data) {
        (Some(url), None) => {
            let parsed = url::Url::parse(url.trim())
                .map_err(|_| AppError::InvalidInput("imageUrl must be a valid URL".into()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::InvalidInput("imageUrl must use http or https".into()));
            }
            Ok(ImageSource::Url(parsed.into()))
        }
        (None, Some(data)) => {
            let data = data.trim();
            let payload = match data.split_once(";base64,") {
                Some((prefix, rest)) if prefix.starts_with("data:") => rest,
                _ => data,
            };
            if payload.is_empty() {
                return Err(AppError::InvalidInput("imageBase64 is empty".into()));
            }
            Ok(ImageSource::Base64(payload.to_string()))
        }
        (Some(_), Some(_)) => Err(AppError::InvalidInput(
            "Provide either imageUrl or imageBase64, not both".into(),
        )),
        (None, None) => Err(AppError::InvalidInput(
            "Either imageUrl or imageBase64 is required".into(),
        )),
    }
}
