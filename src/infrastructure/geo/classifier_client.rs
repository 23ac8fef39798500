use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    entities::geolocation::{ImageSource, LocationCandidate},
    errors::AppError,
    repositories::geolocation::GeoLocator,
};

/// HTTP client for the image geolocation classifier.
#[derive(Clone)]
pub struct GeoClassifierClient {
    http_client: Client,
    api_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct ClassifyRequest<'a> {
    token: &'a str,
    image: &'a str,
    top_k: u8,
}

#[derive(Debug, Default, Deserialize)]
struct ClassifyResponse {
    ai_lat: Option<f64>,
    ai_lon: Option<f64>,
    ai_confidence: Option<f64>,
    city: Option<String>,
    province: Option<String>,
    ai_country: Option<String>,
    #[serde(default)]
    topk_predictions_dict: BTreeMap<String, TopPrediction>,
}

#[derive(Debug, Deserialize)]
struct TopPrediction {
    #[serde(default)]
    address: Address,
    confidence: f64,
    gps: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    province: Option<String>,
    country: Option<String>,
}

impl GeoClassifierClient {
    pub fn new(api_url: &str, api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_url: api_url.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl GeoLocator for GeoClassifierClient {
    async fn locate(&self, image: &ImageSource, top_k: u8) -> Result<Vec<LocationCandidate>, AppError> {
        let request = ClassifyRequest {
            token: &self.api_key,
            image: image.as_str(),
            top_k,
        };

        let response = self.http_client.post(&self.api_url).json(&request).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                parse_candidates(&body)
            }
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(AppError::InternalError(format!(
                    "Geolocation service returned {}: {}",
                    status, text
                )))
            }
        }
    }
}

/// Reads the top-k predictions, falling back to the single top-level answer.
fn parse_candidates(body: &str) -> Result<Vec<LocationCandidate>, AppError> {
    let parsed: ClassifyResponse = serde_json::from_str(body).map_err(|e| {
        AppError::InternalError(format!("Unreadable geolocation response: {}", e))
    })?;

    let mut candidates: Vec<LocationCandidate> = parsed
        .topk_predictions_dict
        .values()
        .filter_map(|p| match p.gps.as_slice() {
            [lat, lon, ..] => Some(LocationCandidate {
                latitude: *lat,
                longitude: *lon,
                confidence: p.confidence,
                location_name: location_name(&[&p.address.city, &p.address.province, &p.address.country]),
            }),
            _ => None,
        })
        .collect();

    if candidates.is_empty() {
        if let (Some(lat), Some(lon)) = (parsed.ai_lat, parsed.ai_lon) {
            candidates.push(LocationCandidate {
                latitude: lat,
                longitude: lon,
                confidence: parsed.ai_confidence.unwrap_or(0.0),
                location_name: location_name(&[&parsed.city, &parsed.province, &parsed.ai_country]),
            });
        }
    }

    Ok(candidates)
}

fn location_name(parts: &[&Option<String>]) -> Option<String> {
    let name = parts
        .iter()
        .filter_map(|p| p.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    (!name.is_empty()).then_some(name)
}
