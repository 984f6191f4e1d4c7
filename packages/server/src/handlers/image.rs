use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use common::{BlobKey, BoxReader};
use sea_orm::*;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::image;
use crate::error::{AppError, ErrorBody, FieldError};
use crate::extractors::json::AppJson;
use crate::handlers::festival::find_festival;
use crate::models::image::*;
use crate::state::AppState;
use crate::utils::media::{public_url_for_key, try_delete_blob};

pub fn image_upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(64 * 1024 * 1024) // 64 MB
}

#[utoipa::path(
    post,
    path = "/api/image",
    tag = "Images",
    operation_id = "createImage",
    summary = "Register an image for a festival",
    description = "Registers an externally hosted image. A festival holds at most one image \
        per `type`; posting an existing type replaces that entry in place.",
    request_body = CreateImageRequest,
    responses(
        (status = 201, description = "Image created", body = ImageEnvelope),
        (status = 200, description = "Image replaced", body = ImageEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(festival_id = payload.festival_id))]
pub async fn create_image(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let errors = validate_create_image(&payload);
    if !errors.is_empty() {
        return Err(AppError::Fields(errors));
    }
    find_festival(&state.db, payload.festival_id).await?;

    let (model, created) = upsert_image(
        &state,
        payload.festival_id,
        &payload.kind,
        payload.image_url,
        payload.description,
        payload.uploaded_date,
    )
    .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let message = if created {
        "Image created successfully"
    } else {
        "Image replaced successfully"
    };

    Ok((
        status,
        Json(ImageEnvelope {
            message: message.into(),
            image: model.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/image/upload",
    tag = "Images",
    operation_id = "uploadImage",
    summary = "Upload an image file for a festival",
    description = "Multipart upload. Required fields: `file`, `festival_id` and `type`; \
        `description` is optional. The file lands in blob storage and the image entry for \
        that type points at its public URL. Uploading an existing type replaces both the \
        entry and, for locally stored images, the old blob.",
    request_body(content_type = "multipart/form-data", description = "Image upload"),
    responses(
        (status = 201, description = "Image uploaded", body = ImageEnvelope),
        (status = 200, description = "Image replaced", body = ImageEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut festival_id: Option<i32> = None;
    let mut kind: Option<String> = None;
    let mut description: Option<String> = None;
    let mut uploaded_date: Option<DateTime<Utc>> = None;
    let mut stored: Option<BlobKey> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("festival_id") => {
                let text = read_text_field(field, "festival_id").await?;
                festival_id = Some(text.trim().parse().map_err(|_| {
                    AppError::Validation("festival_id must be an integer".into())
                })?);
            }
            Some("type") => {
                kind = Some(read_text_field(field, "type").await?);
            }
            Some("description") => {
                description = Some(read_text_field(field, "description").await?);
            }
            Some("uploaded_date") => {
                let text = read_text_field(field, "uploaded_date").await?;
                uploaded_date = Some(
                    crate::models::shared::parse_datetime(text.trim())
                        .map_err(AppError::Validation)?,
                );
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| {
                        AppError::Validation("File field must have a filename".into())
                    })?;
                // A repeated file field supersedes the earlier one; drop its
                // blob so it cannot be orphaned.
                if let Some(previous) = stored.take() {
                    let _ = state.blob_store.delete(&previous).await;
                }
                let key = BlobKey::generate("images", &file_name);
                stream_field_to_store(
                    field,
                    &key,
                    &*state.blob_store,
                    state.config.storage.max_blob_size,
                )
                .await?;
                stored = Some(key);
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let key = stored.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    // The row insert can still fail; drop the fresh blob on any error path
    // so failed uploads do not accumulate on disk.
    let result = async {
        let festival_id = festival_id
            .ok_or_else(|| AppError::Validation("Missing 'festival_id' field".into()))?;
        let kind = kind.ok_or_else(|| AppError::Validation("Missing 'type' field".into()))?;
        if kind.trim().is_empty() {
            return Err(AppError::Validation("type must not be empty".into()));
        }

        find_festival(&state.db, festival_id).await?;

        let image_url = public_url_for_key(&state.config.storage, &key);
        upsert_image(
            &state,
            festival_id,
            &kind,
            image_url,
            description,
            uploaded_date.unwrap_or_else(Utc::now),
        )
        .await
    }
    .await;

    let (model, created) = match result {
        Ok(ok) => ok,
        Err(e) => {
            let _ = state.blob_store.delete(&key).await;
            return Err(e);
        }
    };

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let message = if created {
        "Image uploaded successfully"
    } else {
        "Image replaced successfully"
    };

    Ok((
        status,
        Json(ImageEnvelope {
            message: message.into(),
            image: model.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/image",
    tag = "Images",
    operation_id = "listAllImages",
    summary = "List images across all festivals",
    responses(
        (status = 200, description = "Image list", body = ImageListEnvelope),
    ),
)]
#[instrument(skip(state))]
pub async fn list_all_images(
    State(state): State<AppState>,
) -> Result<Json<ImageListEnvelope>, AppError> {
    let images = image::Entity::find()
        .order_by_asc(image::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ImageBody::from)
        .collect();

    Ok(Json(ImageListEnvelope {
        message: "Images retrieved successfully".into(),
        images,
    }))
}

#[utoipa::path(
    get,
    path = "/api/image/{festival_id}",
    tag = "Images",
    operation_id = "listImages",
    summary = "List a festival's images",
    params(("festival_id" = i32, Path, description = "Festival ID")),
    responses(
        (status = 200, description = "Image list", body = ImageListEnvelope),
        (status = 404, description = "Festival not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id))]
pub async fn list_images(
    State(state): State<AppState>,
    Path(festival_id): Path<i32>,
) -> Result<Json<ImageListEnvelope>, AppError> {
    find_festival(&state.db, festival_id).await?;

    let images = image::Entity::find()
        .filter(image::Column::FestivalId.eq(festival_id))
        .order_by_asc(image::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ImageBody::from)
        .collect();

    Ok(Json(ImageListEnvelope {
        message: "Images retrieved successfully".into(),
        images,
    }))
}

#[utoipa::path(
    get,
    path = "/api/image/{festival_id}/{id}",
    tag = "Images",
    operation_id = "getImage",
    summary = "Get an image entry by ID",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Image detail", body = ImageEnvelope),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id, id))]
pub async fn get_image(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
) -> Result<Json<ImageEnvelope>, AppError> {
    let model = find_image(&state.db, festival_id, id).await?;

    Ok(Json(ImageEnvelope {
        message: "Image retrieved successfully".into(),
        image: model.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/image/{festival_id}/{id}",
    tag = "Images",
    operation_id = "updateImage",
    summary = "Update an image entry",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "Image ID"),
    ),
    request_body = ImageItem,
    responses(
        (status = 200, description = "Image updated", body = ImageEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(festival_id, id))]
pub async fn update_image(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<ImageItem>,
) -> Result<Json<ImageEnvelope>, AppError> {
    let mut errors = Vec::new();
    validate_image_item(&mut errors, "", &payload);
    if !errors.is_empty() {
        return Err(AppError::Fields(errors));
    }

    let existing = find_image(&state.db, festival_id, id).await?;
    let old_url = existing.image_url.clone();

    // Changing the type must not collide with a sibling row's slot.
    let kind = payload.kind.trim().to_string();
    let taken = image::Entity::find()
        .filter(image::Column::FestivalId.eq(festival_id))
        .filter(image::Column::Kind.eq(kind.as_str()))
        .filter(image::Column::Id.ne(id))
        .one(&state.db)
        .await?
        .is_some();
    if taken {
        return Err(AppError::Fields(vec![FieldError::new(
            "type",
            "another image of this festival already uses this type",
        )]));
    }

    let mut active: image::ActiveModel = existing.into();
    active.image_url = Set(payload.image_url.clone());
    active.kind = Set(kind);
    active.description = Set(payload.description);
    active.uploaded_date = Set(payload.uploaded_date);
    let model = active.update(&state.db).await?;

    if old_url != payload.image_url {
        try_delete_blob(&state.config.storage, &*state.blob_store, &old_url).await;
    }

    Ok(Json(ImageEnvelope {
        message: "Image updated successfully".into(),
        image: model.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/image/{festival_id}/{id}",
    tag = "Images",
    operation_id = "deleteImage",
    summary = "Delete an image entry",
    description = "Deletes the image entry and, for locally stored images, its blob.",
    params(
        ("festival_id" = i32, Path, description = "Festival ID"),
        ("id" = i32, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Image deleted", body = ImageEnvelope),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(festival_id, id))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path((festival_id, id)): Path<(i32, i32)>,
) -> Result<Json<ImageEnvelope>, AppError> {
    let existing = find_image(&state.db, festival_id, id).await?;

    image::Entity::delete_by_id(id).exec(&state.db).await?;

    try_delete_blob(&state.config.storage, &*state.blob_store, &existing.image_url).await;

    Ok(Json(ImageEnvelope {
        message: "Image deleted successfully".into(),
        image: existing.into(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_image<C: ConnectionTrait>(
    db: &C,
    festival_id: i32,
    id: i32,
) -> Result<image::Model, AppError> {
    image::Entity::find_by_id(id)
        .filter(image::Column::FestivalId.eq(festival_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))
}

/// Insert or replace the image entry for `(festival_id, kind)`. Returns the
/// saved row and whether it was newly created. A superseded locally stored
/// blob is cleaned up after the transaction commits.
async fn upsert_image(
    state: &AppState,
    festival_id: i32,
    kind: &str,
    image_url: String,
    description: Option<String>,
    uploaded_date: DateTime<Utc>,
) -> Result<(image::Model, bool), AppError> {
    let kind = kind.trim();

    let txn = state.db.begin().await?;
    let existing = image::Entity::find()
        .filter(image::Column::FestivalId.eq(festival_id))
        .filter(image::Column::Kind.eq(kind))
        .lock(sea_orm::sea_query::LockType::Update)
        .one(&txn)
        .await?;

    let (model, created, old_url) = match existing {
        Some(existing) => {
            let old_url = existing.image_url.clone();
            let mut active: image::ActiveModel = existing.into();
            active.image_url = Set(image_url.clone());
            active.description = Set(description);
            active.uploaded_date = Set(uploaded_date);
            let model = active.update(&txn).await?;
            let old_url = (old_url != image_url).then_some(old_url);
            (model, false, old_url)
        }
        None => {
            let new_image = image::ActiveModel {
                festival_id: Set(festival_id),
                image_url: Set(image_url),
                kind: Set(kind.to_string()),
                description: Set(description),
                uploaded_date: Set(uploaded_date),
                ..Default::default()
            };
            let model = new_image.insert(&txn).await.map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    tracing::debug!("Concurrent image upsert: unique constraint caught on insert");
                    AppError::Validation(
                        "An image of this type was created concurrently; retry the request".into(),
                    )
                }
                _ => AppError::from(e),
            })?;
            (model, true, None)
        }
    };
    txn.commit().await?;

    if let Some(old_url) = old_url {
        try_delete_blob(&state.config.storage, &*state.blob_store, &old_url).await;
    }

    Ok((model, created))
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))
}

/// Stream a multipart field into blob storage via a temp file.
async fn stream_field_to_store(
    mut field: axum::extract::multipart::Field<'_>,
    key: &BlobKey,
    blob_store: &dyn common::BlobStore,
    max_size: u64,
) -> Result<(), AppError> {
    let temp_path = std::env::temp_dir().join(format!("festa-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        blob_store.put_stream(key, reader).await?;

        Ok(())
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}
