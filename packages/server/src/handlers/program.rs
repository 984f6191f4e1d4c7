use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{location, program};
use crate::error::{AppError, ErrorBody, FieldError};
use crate::extractors::json::AppJson;
use crate::handlers::festival::find_festival;
use crate::models::program::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/program",
    tag = "Programs",
    operation_id = "createProgram",
    summary = "Add a program entry to a festival",
    description = "Creates a scheduled program entry. `location_id`, when given, must be a \
        location of the same festival.",
    request_body = CreateProgramRequest,
    responses(
        (status = 201, description = "Program created", body = ProgramEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(festival_id = payload.festival_id))]
pub async fn create_program(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProgramRequest>,
) -> Result<impl IntoResponse, AppError> {
    let errors = validate_create_program(&payload);
    if !errors.is_empty() {
        return Err(AppError::Fields(errors));
    }
    find_festival(&state.db, payload.festival_id).await?;
    check_location_ownership(&state.db, payload.festival_id, payload.location_id).await?;

    let new_program = program::ActiveModel {
        festival_id: Set(payload.festival_id),
        name: Set(payload.name.trim().to_string()),
        location_id: Set(payload.location_id),
        start_time: Set(payload.start_time),
        end_time: Set(payload.end_time),
        description: Set(payload.description),
        ..Default::default()
    };
    let model = new_program.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProgramEnvelope {
            message: "Program created successfully".into(),
            program: model.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/program",
    tag = "Programs",
    operation_id = "listAllPrograms",
    summary = "List programs across all festivals",
    responses(
        (status = 200, description = "Program list", body = ProgramListEnvelope),
    ),
)]
#[instrument(skip(state))]
pub async fn list_all_programs(
    State(state): State<AppState>,
) -> Result<Json<ProgramListEnvelope>, AppError> {
    let programs = program::Entity::find()
        .order_by_asc(program::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ProgramBody::from)
        .collect();

    Ok(Json(ProgramListEnvelope {
        message: "Programs retrieved successfully".into(),
        programs,
    }))
}

#[utoipa::path(
    get,
    path = "/api/program/{festival_id}",
    tag = "Programs",
    operation_id = "listPrograms",
    summary = "List a festival's programs",
    params(("festival_id" = i32, Path, description = "Festival ID")),
    responses(
        (status = 200, description = "Program list", body = ProgramListEnvelope),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id))]
pub async fn list_programs(
    State(state): State<AppState>,
    Path(festival_id): Path<i32>,
) -> Result<Json<ProgramListEnvelope>, AppError> {
    find_festival(&state.db, festival_id).await?;

    let programs = program::Entity::find()
        .filter(program::Column::FestivalId.eq(festival_id))
        .order_by_asc(program::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ProgramBody::from)
        .collect();

    Ok(Json(ProgramListEnvelope {
        message: "Programs retrieved successfully".into(),
        programs,
    }))
}

#[utoipa::path(
    get,
    path = "/api/program/{festival_id}/{id}",
    tag = "Programs",
    operation_id = "getProgram",
    summary = "Get a program entry by ID",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "Program ID"),
    ),
    responses(
        (status = 200, description = "Program detail", body = ProgramEnvelope),
        (status = 404, description = "Program not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id, id))]
pub async fn get_program(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
) -> Result<Json<ProgramEnvelope>, AppError> {
    let model = find_program(&state.db, festival_id, id).await?;

    Ok(Json(ProgramEnvelope {
        message: "Program retrieved successfully".into(),
        program: model.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/program/{festival_id}/{id}",
    tag = "Programs",
    operation_id = "updateProgram",
    summary = "Update a program entry",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "Program ID"),
    ),
    request_body = ProgramItem,
    responses(
        (status = 200, description = "Program updated", body = ProgramEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Program not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(festival_id, id))]
pub async fn update_program(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<ProgramItem>,
) -> Result<Json<ProgramEnvelope>, AppError> {
    let mut errors = Vec::new();
    validate_program_item(&mut errors, "", &payload);
    if !errors.is_empty() {
        return Err(AppError::Fields(errors));
    }

    let existing = find_program(&state.db, festival_id, id).await?;
    check_location_ownership(&state.db, festival_id, payload.location_id).await?;

    let mut active: program::ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    active.location_id = Set(payload.location_id);
    active.start_time = Set(payload.start_time);
    active.end_time = Set(payload.end_time);
    active.description = Set(payload.description);
    let model = active.update(&state.db).await?;

    Ok(Json(ProgramEnvelope {
        message: "Program updated successfully".into(),
        program: model.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/program/{festival_id}/{id}",
    tag = "Programs",
    operation_id = "deleteProgram",
    summary = "Delete a program entry",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "Program ID"),
    ),
    responses(
        (status = 200, description = "Program deleted", body = ProgramEnvelope),
        (status = 404, description = "Program not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id, id))]
pub async fn delete_program(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
) -> Result<Json<ProgramEnvelope>, AppError> {
    let existing = find_program(&state.db, festival_id, id).await?;

    program::Entity::delete_by_id(id).exec(&state.db).await?;

    Ok(Json(ProgramEnvelope {
        message: "Program deleted successfully".into(),
        program: existing.into(),
    }))
}

async fn find_program<C: ConnectionTrait>(
    db: &C,
    festival_id: i32,
    id: i32,
) -> Result<program::Model, AppError> {
    program::Entity::find_by_id(id)
        .filter(program::Column::FestivalId.eq(festival_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Program not found".into()))
}

async fn check_location_ownership<C: ConnectionTrait>(
    db: &C,
    festival_id: i32,
    location_id: Option<i32>,
) -> Result<(), AppError> {
    let Some(location_id) = location_id else {
        return Ok(());
    };
    let owned = location::Entity::find_by_id(location_id)
        .filter(location::Column::FestivalId.eq(festival_id))
        .one(db)
        .await?
        .is_some();
    if owned {
        Ok(())
    } else {
        Err(AppError::Fields(vec![FieldError::new(
            "location_id",
            "references a location that does not belong to this festival",
        )]))
    }
}
