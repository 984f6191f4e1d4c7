use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{location, program};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::handlers::festival::find_festival;
use crate::models::location::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/location",
    tag = "Locations",
    operation_id = "createLocation",
    summary = "Add a location to a festival",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created", body = LocationEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(festival_id = payload.festival_id))]
pub async fn create_location(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateLocationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let errors = validate_create_location(&payload);
    if !errors.is_empty() {
        return Err(AppError::Fields(errors));
    }
    find_festival(&state.db, payload.festival_id).await?;

    let new_location = location::ActiveModel {
        festival_id: Set(payload.festival_id),
        kind: Set(payload.kind.trim().to_string()),
        name: Set(payload.name),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        ..Default::default()
    };
    let model = new_location.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(LocationEnvelope {
            message: "Location created successfully".into(),
            location: model.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/location",
    tag = "Locations",
    operation_id = "listAllLocations",
    summary = "List locations across all festivals",
    responses(
        (status = 200, description = "Location list", body = LocationListEnvelope),
    ),
)]
#[instrument(skip(state))]
pub async fn list_all_locations(
    State(state): State<AppState>,
) -> Result<Json<LocationListEnvelope>, AppError> {
    let locations = location::Entity::find()
        .order_by_asc(location::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(LocationBody::from)
        .collect();

    Ok(Json(LocationListEnvelope {
        message: "Locations retrieved successfully".into(),
        locations,
    }))
}

#[utoipa::path(
    get,
    path = "/api/location/{festival_id}",
    tag = "Locations",
    operation_id = "listLocations",
    summary = "List a festival's locations",
    params(("festival_id" = i32, Path, description = "Festival ID")),
    responses(
        (status = 200, description = "Location list", body = LocationListEnvelope),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id))]
pub async fn list_locations(
    State(state): State<AppState>,
    Path(festival_id): Path<i32>,
) -> Result<Json<LocationListEnvelope>, AppError> {
    find_festival(&state.db, festival_id).await?;

    let locations = location::Entity::find()
        .filter(location::Column::FestivalId.eq(festival_id))
        .order_by_asc(location::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(LocationBody::from)
        .collect();

    Ok(Json(LocationListEnvelope {
        message: "Locations retrieved successfully".into(),
        locations,
    }))
}

#[utoipa::path(
    get,
    path = "/api/location/{festival_id}/{id}",
    tag = "Locations",
    operation_id = "getLocation",
    summary = "Get a location by ID",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "Location ID"),
    ),
    responses(
        (status = 200, description = "Location detail", body = LocationEnvelope),
        (status = 404, description = "Location not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id, id))]
pub async fn get_location(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
) -> Result<Json<LocationEnvelope>, AppError> {
    let model = find_location(&state.db, festival_id, id).await?;

    Ok(Json(LocationEnvelope {
        message: "Location retrieved successfully".into(),
        location: model.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/location/{festival_id}/{id}",
    tag = "Locations",
    operation_id = "updateLocation",
    summary = "Update a location",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "Location ID"),
    ),
    request_body = LocationItem,
    responses(
        (status = 200, description = "Location updated", body = LocationEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Location not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(festival_id, id))]
pub async fn update_location(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<LocationItem>,
) -> Result<Json<LocationEnvelope>, AppError> {
    let mut errors = Vec::new();
    validate_location_item(&mut errors, "", &payload);
    if !errors.is_empty() {
        return Err(AppError::Fields(errors));
    }

    let existing = find_location(&state.db, festival_id, id).await?;

    let mut active: location::ActiveModel = existing.into();
    active.kind = Set(payload.kind.trim().to_string());
    active.name = Set(payload.name);
    active.latitude = Set(payload.latitude);
    active.longitude = Set(payload.longitude);
    let model = active.update(&state.db).await?;

    Ok(Json(LocationEnvelope {
        message: "Location updated successfully".into(),
        location: model.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/location/{festival_id}/{id}",
    tag = "Locations",
    operation_id = "deleteLocation",
    summary = "Delete a location",
    description = "Deletes a location. Programs that pointed at it keep running with their \
        location reference cleared.",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "Location ID"),
    ),
    responses(
        (status = 200, description = "Location deleted", body = LocationEnvelope),
        (status = 404, description = "Location not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id, id))]
pub async fn delete_location(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
) -> Result<Json<LocationEnvelope>, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_location(&txn, festival_id, id).await?;

    program::Entity::update_many()
        .col_expr(
            program::Column::LocationId,
            sea_orm::prelude::Expr::value(Option::<i32>::None),
        )
        .filter(program::Column::LocationId.eq(id))
        .exec(&txn)
        .await?;
    location::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(Json(LocationEnvelope {
        message: "Location deleted successfully".into(),
        location: existing.into(),
    }))
}

async fn find_location<C: ConnectionTrait>(
    db: &C,
    festival_id: i32,
    id: i32,
) -> Result<location::Model, AppError> {
    location::Entity::find_by_id(id)
        .filter(location::Column::FestivalId.eq(festival_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found".into()))
}
