use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::image::{ImageBody, ImageItem, validate_image_item};
use super::location::{LocationBody, LocationItem, validate_location_item};
use super::news::{NewsBody, NewsItem, validate_news_item};
use super::program::{ProgramBody, ProgramItem, validate_program_item};
use super::shared::{double_option, double_option_datetime, flexible_datetime_opt, require_text};
use crate::entity::festival;
use crate::error::FieldError;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateFestivalRequest {
    pub name: String,
    pub country: String,
    pub prefecture: String,
    pub city_town: String,
    pub representative: Option<String>,
    pub overview: Option<String>,
    pub history: Option<String>,
    #[serde(default, deserialize_with = "flexible_datetime_opt")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_datetime_opt")]
    pub end_date: Option<DateTime<Utc>>,

    // Nested children, created together with the festival.
    pub locations: Option<Vec<LocationItem>>,
    pub news: Option<Vec<NewsItem>>,
    pub images: Option<Vec<ImageItem>>,
    pub programs: Option<Vec<ProgramItem>>,
}

/// Aggregate update payload. Scalars use merge semantics (absent = keep,
/// nullable fields distinguish absent from explicit null); a collection key
/// that is present replaces that collection wholesale, absent keys are
/// untouched, and an empty array clears the collection.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateFestivalRequest {
    pub name: Option<String>,
    pub country: Option<String>,
    pub prefecture: Option<String>,
    pub city_town: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub representative: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub overview: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub history: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option_datetime")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option_datetime")]
    pub end_date: Option<Option<DateTime<Utc>>>,

    pub locations: Option<Vec<LocationItem>>,
    pub news: Option<Vec<NewsItem>>,
    pub images: Option<Vec<ImageItem>>,
    pub programs: Option<Vec<ProgramItem>>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Festival scalar fields, as returned by create/update/delete.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FestivalBody {
    pub id: i32,
    pub name: String,
    pub country: String,
    pub prefecture: String,
    pub city_town: String,
    pub representative: Option<String>,
    pub overview: Option<String>,
    pub history: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Festival with all four child collections, as returned by reads.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FestivalDetail {
    #[serde(flatten)]
    pub festival: FestivalBody,
    pub locations: Vec<LocationBody>,
    pub news: Vec<NewsBody>,
    pub images: Vec<ImageBody>,
    pub programs: Vec<ProgramBody>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FestivalEnvelope {
    pub message: String,
    pub festival: FestivalBody,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FestivalDetailEnvelope {
    pub message: String,
    pub festival: FestivalDetail,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FestivalListEnvelope {
    pub message: String,
    pub festivals: Vec<FestivalDetail>,
}

impl From<festival::Model> for FestivalBody {
    fn from(m: festival::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            country: m.country,
            prefecture: m.prefecture,
            city_town: m.city_town,
            representative: m.representative,
            overview: m.overview,
            history: m.history,
            start_date: m.start_date,
            end_date: m.end_date,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_festival(req: &CreateFestivalRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_text(&mut errors, "name", &req.name);
    require_text(&mut errors, "country", &req.country);
    require_text(&mut errors, "prefecture", &req.prefecture);
    require_text(&mut errors, "city_town", &req.city_town);

    if let (Some(start), Some(end)) = (req.start_date, req.end_date)
        && end < start
    {
        errors.push(FieldError::new(
            "end_date",
            "end_date must not be before start_date",
        ));
    }

    validate_collections(
        &mut errors,
        req.locations.as_deref(),
        req.news.as_deref(),
        req.images.as_deref(),
        req.programs.as_deref(),
    );

    // A brand-new festival has no persisted locations its nested programs
    // could reference yet; linking happens via the update endpoints.
    if let Some(programs) = &req.programs {
        for (i, item) in programs.iter().enumerate() {
            if item.location_id.is_some() {
                errors.push(FieldError::new(
                    format!("programs[{i}].location_id"),
                    "cannot reference a location when creating a festival",
                ));
            }
        }
    }

    errors
}

pub fn validate_update_festival(req: &UpdateFestivalRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(ref name) = req.name {
        require_text(&mut errors, "name", name);
    }
    if let Some(ref country) = req.country {
        require_text(&mut errors, "country", country);
    }
    if let Some(ref prefecture) = req.prefecture {
        require_text(&mut errors, "prefecture", prefecture);
    }
    if let Some(ref city_town) = req.city_town {
        require_text(&mut errors, "city_town", city_town);
    }

    if let (Some(Some(start)), Some(Some(end))) = (req.start_date, req.end_date)
        && end < start
    {
        errors.push(FieldError::new(
            "end_date",
            "end_date must not be before start_date",
        ));
    }

    validate_collections(
        &mut errors,
        req.locations.as_deref(),
        req.news.as_deref(),
        req.images.as_deref(),
        req.programs.as_deref(),
    );

    errors
}

/// Validate every element of every supplied collection, collecting all
/// per-element errors so the caller sees every problem in one response.
fn validate_collections(
    errors: &mut Vec<FieldError>,
    locations: Option<&[LocationItem]>,
    news: Option<&[NewsItem]>,
    images: Option<&[ImageItem]>,
    programs: Option<&[ProgramItem]>,
) {
    if let Some(locations) = locations {
        for (i, item) in locations.iter().enumerate() {
            validate_location_item(errors, &format!("locations[{i}]."), item);
        }
    }
    if let Some(news) = news {
        for (i, item) in news.iter().enumerate() {
            validate_news_item(errors, &format!("news[{i}]."), item);
        }
    }
    if let Some(images) = images {
        let mut seen_kinds = HashSet::new();
        for (i, item) in images.iter().enumerate() {
            validate_image_item(errors, &format!("images[{i}]."), item);
            // One image per type; a payload with two entries for the same
            // slot has no well-defined winner.
            if !seen_kinds.insert(item.kind.trim()) {
                errors.push(FieldError::new(
                    format!("images[{i}].type"),
                    "duplicate image type; a festival holds one image per type",
                ));
            }
        }
    }
    if let Some(programs) = programs {
        for (i, item) in programs.iter().enumerate() {
            validate_program_item(errors, &format!("programs[{i}]."), item);
        }
    }
}
