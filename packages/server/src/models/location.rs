use serde::{Deserialize, Serialize};

use super::shared::{check_latitude, check_longitude, require_text};
use crate::entity::location;
use crate::error::FieldError;

/// Location fields as supplied by clients: nested inside festival payloads
/// and as the body of the standalone update endpoint.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LocationItem {
    /// Category tag, e.g. "main venue", "parking", "restroom", "trash".
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateLocationRequest {
    pub festival_id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LocationBody {
    pub id: i32,
    pub festival_id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LocationEnvelope {
    pub message: String,
    pub location: LocationBody,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LocationListEnvelope {
    pub message: String,
    pub locations: Vec<LocationBody>,
}

impl From<location::Model> for LocationBody {
    fn from(m: location::Model) -> Self {
        Self {
            id: m.id,
            festival_id: m.festival_id,
            kind: m.kind,
            name: m.name,
            latitude: m.latitude,
            longitude: m.longitude,
        }
    }
}

/// Validate one location item; `path` prefixes field names for nested
/// payloads ("locations[2].").
pub fn validate_location_item(errors: &mut Vec<FieldError>, path: &str, item: &LocationItem) {
    require_text(errors, &format!("{path}type"), &item.kind);
    check_latitude(errors, &format!("{path}latitude"), item.latitude);
    check_longitude(errors, &format!("{path}longitude"), item.longitude);
}

pub fn validate_create_location(req: &CreateLocationRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_text(&mut errors, "type", &req.kind);
    check_latitude(&mut errors, "latitude", req.latitude);
    check_longitude(&mut errors, "longitude", req.longitude);
    errors
}
