use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::news;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::handlers::festival::find_festival;
use crate::models::news::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/news",
    tag = "News",
    operation_id = "createNews",
    summary = "Post a news entry for a festival",
    request_body = CreateNewsRequest,
    responses(
        (status = 201, description = "News created", body = NewsEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(festival_id = payload.festival_id))]
pub async fn create_news(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateNewsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let errors = validate_create_news(&payload);
    if !errors.is_empty() {
        return Err(AppError::Fields(errors));
    }
    find_festival(&state.db, payload.festival_id).await?;

    let new_news = news::ActiveModel {
        festival_id: Set(payload.festival_id),
        importance: Set(payload.importance),
        posted_date: Set(payload.posted_date),
        title: Set(payload.title.trim().to_string()),
        content: Set(payload.content),
        ..Default::default()
    };
    let model = new_news.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(NewsEnvelope {
            message: "News created successfully".into(),
            news: model.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/news",
    tag = "News",
    operation_id = "listAllNews",
    summary = "List news across all festivals",
    responses(
        (status = 200, description = "News list", body = NewsListEnvelope),
    ),
)]
#[instrument(skip(state))]
pub async fn list_all_news(
    State(state): State<AppState>,
) -> Result<Json<NewsListEnvelope>, AppError> {
    let news = news::Entity::find()
        .order_by_asc(news::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(NewsBody::from)
        .collect();

    Ok(Json(NewsListEnvelope {
        message: "News retrieved successfully".into(),
        news,
    }))
}

#[utoipa::path(
    get,
    path = "/api/news/{festival_id}",
    tag = "News",
    operation_id = "listNews",
    summary = "List a festival's news",
    params(("festival_id" = i32, Path, description = "Festival ID")),
    responses(
        (status = 200, description = "News list", body = NewsListEnvelope),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id))]
pub async fn list_news(
    State(state): State<AppState>,
    Path(festival_id): Path<i32>,
) -> Result<Json<NewsListEnvelope>, AppError> {
    find_festival(&state.db, festival_id).await?;

    let news = news::Entity::find()
        .filter(news::Column::FestivalId.eq(festival_id))
        .order_by_asc(news::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(NewsBody::from)
        .collect();

    Ok(Json(NewsListEnvelope {
        message: "News retrieved successfully".into(),
        news,
    }))
}

#[utoipa::path(
    get,
    path = "/api/news/{festival_id}/{id}",
    tag = "News",
    operation_id = "getNews",
    summary = "Get a news entry by ID",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "News ID"),
    ),
    responses(
        (status = 200, description = "News detail", body = NewsEnvelope),
        (status = 404, description = "News not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id, id))]
pub async fn get_news(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
) -> Result<Json<NewsEnvelope>, AppError> {
    let model = find_news(&state.db, festival_id, id).await?;

    Ok(Json(NewsEnvelope {
        message: "News retrieved successfully".into(),
        news: model.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/news/{festival_id}/{id}",
    tag = "News",
    operation_id = "updateNews",
    summary = "Update a news entry",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "News ID"),
    ),
    request_body = NewsItem,
    responses(
        (status = 200, description = "News updated", body = NewsEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "News not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(festival_id, id))]
pub async fn update_news(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<NewsItem>,
) -> Result<Json<NewsEnvelope>, AppError> {
    let mut errors = Vec::new();
    validate_news_item(&mut errors, "", &payload);
    if !errors.is_empty() {
        return Err(AppError::Fields(errors));
    }

    let existing = find_news(&state.db, festival_id, id).await?;

    let mut active: news::ActiveModel = existing.into();
    active.importance = Set(payload.importance);
    active.posted_date = Set(payload.posted_date);
    active.title = Set(payload.title.trim().to_string());
    active.content = Set(payload.content);
    let model = active.update(&state.db).await?;

    Ok(Json(NewsEnvelope {
        message: "News updated successfully".into(),
        news: model.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/news/{festival_id}/{id}",
    tag = "News",
    operation_id = "deleteNews",
    summary = "Delete a news entry",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "News ID"),
    ),
    responses(
        (status = 200, description = "News deleted", body = NewsEnvelope),
        (status = 404, description = "News not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id, id))]
pub async fn delete_news(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
) -> Result<Json<NewsEnvelope>, AppError> {
    let existing = find_news(&state.db, festival_id, id).await?;

    news::Entity::delete_by_id(id).exec(&state.db).await?;

    Ok(Json(NewsEnvelope {
        message: "News deleted successfully".into(),
        news: existing.into(),
    }))
}

async fn find_news<C: ConnectionTrait>(
    db: &C,
    festival_id: i32,
    id: i32,
) -> Result<news::Model, AppError> {
    news::Entity::find_by_id(id)
        .filter(news::Column::FestivalId.eq(festival_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("News not found".into()))
}
