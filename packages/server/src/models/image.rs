use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{check_image_url, flexible_datetime, require_text};
use crate::entity::image;
use crate::error::FieldError;

/// Image fields as supplied by clients (JSON variant; the multipart upload
/// derives `image_url` from blob storage instead).
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ImageItem {
    pub image_url: String,
    /// Slot tag: "thumbnail", "overview", "history", ...
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "flexible_datetime")]
    pub uploaded_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateImageRequest {
    pub festival_id: i32,
    pub image_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "flexible_datetime")]
    pub uploaded_date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ImageBody {
    pub id: i32,
    pub festival_id: i32,
    pub image_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub uploaded_date: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageEnvelope {
    pub message: String,
    pub image: ImageBody,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageListEnvelope {
    pub message: String,
    pub images: Vec<ImageBody>,
}

impl From<image::Model> for ImageBody {
    fn from(m: image::Model) -> Self {
        Self {
            id: m.id,
            festival_id: m.festival_id,
            image_url: m.image_url,
            kind: m.kind,
            description: m.description,
            uploaded_date: m.uploaded_date,
        }
    }
}

pub fn validate_image_item(errors: &mut Vec<FieldError>, path: &str, item: &ImageItem) {
    check_image_url(errors, &format!("{path}image_url"), &item.image_url);
    require_text(errors, &format!("{path}type"), &item.kind);
}

pub fn validate_create_image(req: &CreateImageRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_image_url(&mut errors, "image_url", &req.image_url);
    require_text(&mut errors, "type", &req.kind);
    errors
}
