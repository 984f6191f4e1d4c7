use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{check_time_order, flexible_datetime, flexible_datetime_opt, require_text};
use crate::entity::program;
use crate::error::FieldError;

/// Program fields as supplied by clients.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ProgramItem {
    pub name: String,
    pub location_id: Option<i32>,
    #[serde(deserialize_with = "flexible_datetime")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "flexible_datetime_opt")]
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateProgramRequest {
    pub festival_id: i32,
    pub name: String,
    pub location_id: Option<i32>,
    #[serde(deserialize_with = "flexible_datetime")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "flexible_datetime_opt")]
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProgramBody {
    pub id: i32,
    pub festival_id: i32,
    pub name: String,
    pub location_id: Option<i32>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProgramEnvelope {
    pub message: String,
    pub program: ProgramBody,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProgramListEnvelope {
    pub message: String,
    pub programs: Vec<ProgramBody>,
}

impl From<program::Model> for ProgramBody {
    fn from(m: program::Model) -> Self {
        Self {
            id: m.id,
            festival_id: m.festival_id,
            name: m.name,
            location_id: m.location_id,
            start_time: m.start_time,
            end_time: m.end_time,
            description: m.description,
        }
    }
}

pub fn validate_program_item(errors: &mut Vec<FieldError>, path: &str, item: &ProgramItem) {
    require_text(errors, &format!("{path}name"), &item.name);
    check_time_order(
        errors,
        &format!("{path}end_time"),
        item.start_time,
        item.end_time,
    );
}

pub fn validate_create_program(req: &CreateProgramRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_text(&mut errors, "name", &req.name);
    check_time_order(&mut errors, "end_time", req.start_time, req.end_time);
    errors
}
