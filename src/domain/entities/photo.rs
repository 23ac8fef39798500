use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

const MAX_TITLE_LENGTH: usize = 200;
const MAX_LOCATION_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub image_url: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    pub fn is_geotagged(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct PhotoInsert {
    pub user_id: Uuid,
    pub title: String,
    pub image_url: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// JSON body for creating a photo whose binary already lives in object storage.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhotoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_url: String,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub longitude: Option<f64>,
}

impl NewPhotoRequest {
    pub fn prepare_for_insert(self, owner_id: Uuid) -> Result<PhotoInsert, AppError> {
        let meta = PhotoMetadata::new(self.title, self.location, self.latitude, self.longitude)?;
        let image_url = self.image_url.trim().to_string();
        if image_url.is_empty() {
            return Err(AppError::InvalidInput("imageUrl is required".into()));
        }
        Ok(meta.into_insert(owner_id, image_url))
    }
}

/// Validated title, location label and coordinate pair shared by JSON and multipart creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoMetadata {
    pub title: String,
    pub location: Option<String>,
    pub coordinates: Option<(f64, f64)>,
}

impl PhotoMetadata {
    pub fn new(
        title: String,
        location: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Self, AppError> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::InvalidInput("title is required".into()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(AppError::InvalidInput(format!("title must be at most {} characters", MAX_TITLE_LENGTH)));
        }

        let location = location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        if location.as_ref().is_some_and(|l| l.chars().count() > MAX_LOCATION_LENGTH) {
            return Err(AppError::InvalidInput(format!("location must be at most {} characters", MAX_LOCATION_LENGTH)));
        }

        Ok(PhotoMetadata {
            title,
            location,
            coordinates: validate_coordinates(latitude, longitude)?,
        })
    }

    pub fn into_insert(self, owner_id: Uuid, image_url: String) -> PhotoInsert {
        let (latitude, longitude) = match self.coordinates {
            Some((lat, lon)) => (Some(lat), Some(lon)),
            None => (None, None),
        };
        PhotoInsert {
            user_id: owner_id,
            title: self.title,
            image_url,
            location: self.location,
            latitude,
            longitude,
            created_at: Utc::now(),
        }
    }
}

/// Both coordinates or neither, each within its geographic range.
pub fn validate_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<(f64, f64)>, AppError> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(AppError::InvalidInput("latitude must be between -90 and 90".into()));
            }
            if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                return Err(AppError::InvalidInput("longitude must be between -180 and 180".into()));
            }
            Ok(Some((lat, lon)))
        }
        _ => Err(AppError::InvalidInput(
            "latitude and longitude must be provided together".into(),
        )),
    }
}

/// Parses a coordinate sent either as a number or as a numeric string. Blank strings count as absent.
pub fn parse_coordinate(raw: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| format!("'{}' is not a valid coordinate", trimmed))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) => parse_coordinate(&s).map_err(serde::de::Error::custom),
    }
}

/// Multipart upload: the image binary plus the same metadata as the JSON form.
#[derive(Debug, MultipartForm)]
pub struct PhotoUploadForm {
    #[multipart(limit = "10MB")]
    pub file: Bytes,
    pub title: Text<String>,
    pub location: Option<Text<String>>,
    pub latitude: Option<Text<String>>,
    pub longitude: Option<Text<String>>,
}

impl PhotoUploadForm {
    pub fn metadata(&self) -> Result<PhotoMetadata, AppError> {
        let coordinate = |field: &Option<Text<String>>| -> Result<Option<f64>, AppError> {
            match field {
                Some(raw) => parse_coordinate(raw.as_str()).map_err(AppError::InvalidInput),
                None => Ok(None),
            }
        };

        PhotoMetadata::new(
            self.title.0.clone(),
            self.location.as_ref().map(|l| l.0.clone()),
            coordinate(&self.latitude)?,
            coordinate(&self.longitude)?,
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCreatedResponse {
    pub id: Uuid,
    pub image_url: String,
    pub message: String,
}
