use std::collections::{HashMap, HashSet};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{festival, image, location, news, program};
use crate::error::{AppError, ErrorBody, FieldError};
use crate::extractors::json::AppJson;
use crate::models::festival::*;
use crate::models::image::{ImageBody, ImageItem};
use crate::models::location::{LocationBody, LocationItem};
use crate::models::news::{NewsBody, NewsItem};
use crate::models::program::{ProgramBody, ProgramItem};
use crate::state::AppState;
use crate::utils::media::try_delete_blob;

#[utoipa::path(
    post,
    path = "/api/festival",
    tag = "Festivals",
    operation_id = "createFestival",
    summary = "Create a festival",
    description = "Creates a festival together with any nested locations, news, images and \
        programs supplied in the payload. Nested programs may not reference locations yet; \
        link them afterwards via the update endpoints.",
    request_body = CreateFestivalRequest,
    responses(
        (status = 201, description = "Festival created", body = FestivalDetailEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_festival(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateFestivalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let errors = validate_create_festival(&payload);
    if !errors.is_empty() {
        return Err(AppError::Fields(errors));
    }

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let new_festival = festival::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        country: Set(payload.country.trim().to_string()),
        prefecture: Set(payload.prefecture.trim().to_string()),
        city_town: Set(payload.city_town.trim().to_string()),
        representative: Set(payload.representative),
        overview: Set(payload.overview),
        history: Set(payload.history),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_festival.insert(&txn).await?;

    if let Some(ref items) = payload.locations {
        replace_locations(&txn, model.id, items).await?;
    }
    if let Some(ref items) = payload.news {
        replace_news(&txn, model.id, items).await?;
    }
    if let Some(ref items) = payload.images {
        replace_images(&txn, model.id, items).await?;
    }
    if let Some(ref items) = payload.programs {
        replace_programs(&txn, model.id, items).await?;
    }

    let detail = load_detail(&txn, model).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(FestivalDetailEnvelope {
            message: "Festival created successfully".into(),
            festival: detail,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/festival",
    tag = "Festivals",
    operation_id = "listFestivals",
    summary = "List all festivals",
    description = "Returns every festival with its locations, news, images and programs.",
    responses(
        (status = 200, description = "Festival list", body = FestivalListEnvelope),
    ),
)]
#[instrument(skip(state))]
pub async fn list_festivals(
    State(state): State<AppState>,
) -> Result<Json<FestivalListEnvelope>, AppError> {
    let festivals = festival::Entity::find()
        .order_by_asc(festival::Column::Id)
        .all(&state.db)
        .await?;

    let festivals = load_details(&state.db, festivals).await?;

    Ok(Json(FestivalListEnvelope {
        message: "Festivals retrieved successfully".into(),
        festivals,
    }))
}

#[utoipa::path(
    get,
    path = "/api/festival/{id}",
    tag = "Festivals",
    operation_id = "getFestival",
    summary = "Get a festival by ID",
    params(("id" = i32, Path, description = "Festival ID")),
    responses(
        (status = 200, description = "Festival detail", body = FestivalDetailEnvelope),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_festival(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FestivalDetailEnvelope>, AppError> {
    let model = find_festival(&state.db, id).await?;
    let festival = load_detail(&state.db, model).await?;

    Ok(Json(FestivalDetailEnvelope {
        message: "Festival retrieved successfully".into(),
        festival,
    }))
}

#[utoipa::path(
    put,
    path = "/api/festival/{id}",
    tag = "Festivals",
    operation_id = "updateFestival",
    summary = "Update a festival and its collections",
    description = "Merges scalar fields and replaces exactly the child collections present in \
        the payload, all in one transaction. An absent collection key leaves that collection \
        untouched; an empty array clears it. Program entries may reference locations of this \
        festival only.",
    params(("id" = i32, Path, description = "Festival ID")),
    request_body = UpdateFestivalRequest,
    responses(
        (status = 200, description = "Festival updated", body = FestivalEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_festival(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateFestivalRequest>,
) -> Result<Json<FestivalEnvelope>, AppError> {
    let errors = validate_update_festival(&payload);
    if !errors.is_empty() {
        return Err(AppError::Fields(errors));
    }

    let txn = state.db.begin().await?;
    let existing = find_festival_for_update(&txn, id).await?;

    // Cross-field date validation against existing values.
    let effective_start = payload.start_date.unwrap_or(existing.start_date);
    let effective_end = payload.end_date.unwrap_or(existing.end_date);
    if let (Some(start), Some(end)) = (effective_start, effective_end)
        && end < start
    {
        return Err(AppError::Fields(vec![FieldError::new(
            "end_date",
            "end_date must not be before start_date",
        )]));
    }

    let mut active: festival::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref country) = payload.country {
        active.country = Set(country.trim().to_string());
    }
    if let Some(ref prefecture) = payload.prefecture {
        active.prefecture = Set(prefecture.trim().to_string());
    }
    if let Some(ref city_town) = payload.city_town {
        active.city_town = Set(city_town.trim().to_string());
    }
    if let Some(representative) = payload.representative {
        active.representative = Set(representative);
    }
    if let Some(overview) = payload.overview {
        active.overview = Set(overview);
    }
    if let Some(history) = payload.history {
        active.history = Set(history);
    }
    if let Some(start_date) = payload.start_date {
        active.start_date = Set(start_date);
    }
    if let Some(end_date) = payload.end_date {
        active.end_date = Set(end_date);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;

    let mut stale_image_urls = Vec::new();
    if let Some(ref items) = payload.locations {
        replace_locations(&txn, id, items).await?;
    }
    if let Some(ref items) = payload.news {
        replace_news(&txn, id, items).await?;
    }
    if let Some(ref items) = payload.images {
        let old_urls = replace_images(&txn, id, items).await?;
        let kept: HashSet<&str> = items.iter().map(|it| it.image_url.as_str()).collect();
        stale_image_urls = old_urls
            .into_iter()
            .filter(|url| !kept.contains(url.as_str()))
            .collect();
    }
    if let Some(ref items) = payload.programs {
        replace_programs(&txn, id, items).await?;
    }

    txn.commit().await?;

    for url in &stale_image_urls {
        try_delete_blob(&state.config.storage, &*state.blob_store, url).await;
    }

    Ok(Json(FestivalEnvelope {
        message: "Festival updated successfully".into(),
        festival: model.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/festival/{id}",
    tag = "Festivals",
    operation_id = "deleteFestival",
    summary = "Delete a festival",
    description = "Deletes a festival and all of its locations, news, images and programs. \
        Blobs backing locally stored images are removed after the transaction commits.",
    params(("id" = i32, Path, description = "Festival ID")),
    responses(
        (status = 200, description = "Festival deleted", body = FestivalEnvelope),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_festival(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FestivalEnvelope>, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_festival_for_update(&txn, id).await?;

    let image_urls: Vec<String> = image::Entity::find()
        .filter(image::Column::FestivalId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| m.image_url)
        .collect();

    // Programs reference locations, so they go first.
    program::Entity::delete_many()
        .filter(program::Column::FestivalId.eq(id))
        .exec(&txn)
        .await?;
    location::Entity::delete_many()
        .filter(location::Column::FestivalId.eq(id))
        .exec(&txn)
        .await?;
    news::Entity::delete_many()
        .filter(news::Column::FestivalId.eq(id))
        .exec(&txn)
        .await?;
    image::Entity::delete_many()
        .filter(image::Column::FestivalId.eq(id))
        .exec(&txn)
        .await?;
    festival::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    for url in &image_urls {
        try_delete_blob(&state.config.storage, &*state.blob_store, url).await;
    }

    Ok(Json(FestivalEnvelope {
        message: "Festival deleted successfully".into(),
        festival: existing.into(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_festival<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<festival::Model, AppError> {
    festival::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Festival not found".into()))
}

async fn find_festival_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<festival::Model, AppError> {
    use sea_orm::sea_query::LockType;
    festival::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Festival not found".into()))
}

async fn load_detail<C: ConnectionTrait>(
    db: &C,
    model: festival::Model,
) -> Result<FestivalDetail, AppError> {
    let mut details = load_details(db, vec![model]).await?;
    details
        .pop()
        .ok_or_else(|| AppError::Internal("festival vanished while loading detail".into()))
}

/// Load the four child collections for a batch of festivals in four queries.
async fn load_details<C: ConnectionTrait>(
    db: &C,
    festivals: Vec<festival::Model>,
) -> Result<Vec<FestivalDetail>, AppError> {
    let ids: Vec<i32> = festivals.iter().map(|f| f.id).collect();

    let mut locations: HashMap<i32, Vec<LocationBody>> = HashMap::new();
    for m in location::Entity::find()
        .filter(location::Column::FestivalId.is_in(ids.clone()))
        .order_by_asc(location::Column::Id)
        .all(db)
        .await?
    {
        locations.entry(m.festival_id).or_default().push(m.into());
    }

    let mut news_items: HashMap<i32, Vec<NewsBody>> = HashMap::new();
    for m in news::Entity::find()
        .filter(news::Column::FestivalId.is_in(ids.clone()))
        .order_by_asc(news::Column::Id)
        .all(db)
        .await?
    {
        news_items.entry(m.festival_id).or_default().push(m.into());
    }

    let mut images: HashMap<i32, Vec<ImageBody>> = HashMap::new();
    for m in image::Entity::find()
        .filter(image::Column::FestivalId.is_in(ids.clone()))
        .order_by_asc(image::Column::Id)
        .all(db)
        .await?
    {
        images.entry(m.festival_id).or_default().push(m.into());
    }

    let mut programs: HashMap<i32, Vec<ProgramBody>> = HashMap::new();
    for m in program::Entity::find()
        .filter(program::Column::FestivalId.is_in(ids))
        .order_by_asc(program::Column::Id)
        .all(db)
        .await?
    {
        programs.entry(m.festival_id).or_default().push(m.into());
    }

    Ok(festivals
        .into_iter()
        .map(|f| {
            let id = f.id;
            FestivalDetail {
                festival: f.into(),
                locations: locations.remove(&id).unwrap_or_default(),
                news: news_items.remove(&id).unwrap_or_default(),
                images: images.remove(&id).unwrap_or_default(),
                programs: programs.remove(&id).unwrap_or_default(),
            }
        })
        .collect())
}

async fn replace_locations(
    txn: &DatabaseTransaction,
    festival_id: i32,
    items: &[LocationItem],
) -> Result<(), AppError> {
    // Existing programs may point at the locations about to be deleted;
    // the links are re-established if the payload also replaces programs.
    program::Entity::update_many()
        .col_expr(program::Column::LocationId, Expr::value(Option::<i32>::None))
        .filter(program::Column::FestivalId.eq(festival_id))
        .exec(txn)
        .await?;

    location::Entity::delete_many()
        .filter(location::Column::FestivalId.eq(festival_id))
        .exec(txn)
        .await?;

    let rows: Vec<location::ActiveModel> = items
        .iter()
        .map(|it| location::ActiveModel {
            festival_id: Set(festival_id),
            kind: Set(it.kind.trim().to_string()),
            name: Set(it.name.clone()),
            latitude: Set(it.latitude),
            longitude: Set(it.longitude),
            ..Default::default()
        })
        .collect();
    if !rows.is_empty() {
        location::Entity::insert_many(rows).exec(txn).await?;
    }
    Ok(())
}

async fn replace_news(
    txn: &DatabaseTransaction,
    festival_id: i32,
    items: &[NewsItem],
) -> Result<(), AppError> {
    news::Entity::delete_many()
        .filter(news::Column::FestivalId.eq(festival_id))
        .exec(txn)
        .await?;

    let rows: Vec<news::ActiveModel> = items
        .iter()
        .map(|it| news::ActiveModel {
            festival_id: Set(festival_id),
            importance: Set(it.importance.clone()),
            posted_date: Set(it.posted_date),
            title: Set(it.title.trim().to_string()),
            content: Set(it.content.clone()),
            ..Default::default()
        })
        .collect();
    if !rows.is_empty() {
        news::Entity::insert_many(rows).exec(txn).await?;
    }
    Ok(())
}

/// Replace the image collection, returning the URLs of the rows that were
/// deleted so the caller can clean up locally stored blobs after commit.
async fn replace_images(
    txn: &DatabaseTransaction,
    festival_id: i32,
    items: &[ImageItem],
) -> Result<Vec<String>, AppError> {
    let old_urls: Vec<String> = image::Entity::find()
        .filter(image::Column::FestivalId.eq(festival_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|m| m.image_url)
        .collect();

    image::Entity::delete_many()
        .filter(image::Column::FestivalId.eq(festival_id))
        .exec(txn)
        .await?;

    let rows: Vec<image::ActiveModel> = items
        .iter()
        .map(|it| image::ActiveModel {
            festival_id: Set(festival_id),
            image_url: Set(it.image_url.clone()),
            kind: Set(it.kind.trim().to_string()),
            description: Set(it.description.clone()),
            uploaded_date: Set(it.uploaded_date),
            ..Default::default()
        })
        .collect();
    if !rows.is_empty() {
        image::Entity::insert_many(rows).exec(txn).await?;
    }
    Ok(old_urls)
}

async fn replace_programs(
    txn: &DatabaseTransaction,
    festival_id: i32,
    items: &[ProgramItem],
) -> Result<(), AppError> {
    // Location references are checked against the post-replacement set,
    // since locations are replaced before programs.
    let location_ids: HashSet<i32> = location::Entity::find()
        .filter(location::Column::FestivalId.eq(festival_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|l| l.id)
        .collect();

    let mut errors = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if let Some(location_id) = item.location_id
            && !location_ids.contains(&location_id)
        {
            errors.push(FieldError::new(
                format!("programs[{i}].location_id"),
                "references a location that does not belong to this festival",
            ));
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Fields(errors));
    }

    program::Entity::delete_many()
        .filter(program::Column::FestivalId.eq(festival_id))
        .exec(txn)
        .await?;

    let rows: Vec<program::ActiveModel> = items
        .iter()
        .map(|it| program::ActiveModel {
            festival_id: Set(festival_id),
            name: Set(it.name.trim().to_string()),
            location_id: Set(it.location_id),
            start_time: Set(it.start_time),
            end_time: Set(it.end_time),
            description: Set(it.description.clone()),
            ..Default::default()
        })
        .collect();
    if !rows.is_empty() {
        program::Entity::insert_many(rows).exec(txn).await?;
    }
    Ok(())
}
