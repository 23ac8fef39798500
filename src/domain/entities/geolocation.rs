use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of a location-detection request; exactly one of the two fields is expected.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DetectLocationRequest {
    #[validate(url(message = "imageUrl must be a valid URL"))]
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
}

/// What gets sent to the classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Url(String),
    Base64(String),
}

impl ImageSource {
    pub fn as_str(&self) -> &str {
        match self {
            ImageSource::Url(url) => url,
            ImageSource::Base64(data) => data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCandidate {
    pub latitude: f64,
    pub longitude: f64,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DetectLocationResponse {
    pub candidates: Vec<LocationCandidate>,
}
