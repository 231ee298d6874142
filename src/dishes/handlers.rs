use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{DishListQuery, DishRequest, DishResponse},
    repo::{self, DishFilter, Visibility},
    repo_types::Dish,
    services::{DietaryFilter, DishDraft},
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
    storage::ext_from_mime,
};

const IMAGE_LIMIT_BYTES: usize = 10 * 1024 * 1024;
const IMAGE_URL_TTL_SECS: u64 = 600;

pub fn dish_routes() -> Router<AppState> {
    Router::new()
        .route("/dishes", get(list_dishes).post(create_dish))
        .route(
            "/dishes/:id",
            get(get_dish).put(update_dish).delete(delete_dish),
        )
        .route(
            "/dishes/:id/image",
            get(get_dish_image)
                .post(upload_dish_image)
                .layer(DefaultBodyLimit::max(IMAGE_LIMIT_BYTES)),
        )
}

/// Dish the caller is allowed to see: approved, or their own.
async fn visible_dish(state: &AppState, user_id: Uuid, id: Uuid) -> AppResult<Dish> {
    match repo::find(&state.db, id).await? {
        Some(d) if d.approved || d.owner_id == user_id => Ok(d),
        _ => Err(AppError::NotFound("Dish")),
    }
}

async fn owned_dish(state: &AppState, user_id: Uuid, id: Uuid) -> AppResult<Dish> {
    let dish = repo::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Dish"))?;
    if dish.owner_id != user_id {
        warn!(%user_id, dish_id = %id, "dish write by non-owner");
        return Err(AppError::Forbidden("Only the owner can change this dish".into()));
    }
    Ok(dish)
}

#[instrument(skip(state))]
pub async fn list_dishes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DishListQuery>,
) -> AppResult<Json<Vec<DishResponse>>> {
    let mut dietary = q.diet.map(DietaryFilter::for_diet).unwrap_or_default();
    dietary.vegetarian |= q.vegetarian;
    dietary.vegan |= q.vegan;
    dietary.gluten_free |= q.gluten_free;
    dietary.dairy_free |= q.dairy_free;

    let filter = DishFilter {
        category: q.category.as_deref().map(str::trim).filter(|c| !c.is_empty()),
        search: q.search.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        dietary,
    };
    let visibility = if q.mine {
        Visibility::Owner(user_id)
    } else {
        Visibility::Viewer(user_id)
    };

    let dishes = repo::list(
        &state.db,
        visibility,
        &filter,
        q.limit.clamp(1, 200),
        q.offset.max(0),
    )
    .await?;
    Ok(Json(dishes.into_iter().map(DishResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_dish(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DishResponse>> {
    Ok(Json(visible_dish(&state, user_id, id).await?.into()))
}

#[instrument(skip(state, body))]
pub async fn create_dish(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<DishRequest>,
) -> AppResult<(StatusCode, Json<DishResponse>)> {
    let draft = DishDraft::from(body).validate().map_err(AppError::BadRequest)?;
    let dish = repo::insert(&state.db, user_id, &draft).await?;
    info!(%user_id, dish_id = %dish.id, name = %dish.name, "dish created");
    Ok((StatusCode::CREATED, Json(dish.into())))
}

/// Editing puts the dish back into the approval queue.
#[instrument(skip(state, body))]
pub async fn update_dish(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<DishRequest>,
) -> AppResult<Json<DishResponse>> {
    owned_dish(&state, user_id, id).await?;
    let draft = DishDraft::from(body).validate().map_err(AppError::BadRequest)?;
    let dish = repo::update(&state.db, id, &draft, false)
        .await?
        .ok_or(AppError::NotFound("Dish"))?;
    info!(%user_id, dish_id = %id, "dish updated, approval reset");
    Ok(Json(dish.into()))
}

#[instrument(skip(state))]
pub async fn delete_dish(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let dish = owned_dish(&state, user_id, id).await?;
    remove_dish(&state, dish).await?;
    info!(%user_id, dish_id = %id, "dish deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete the row, then its image. A failed image delete only leaves an orphan object.
pub(crate) async fn remove_dish(state: &AppState, dish: Dish) -> AppResult<()> {
    if !repo::delete(&state.db, dish.id).await? {
        return Err(AppError::NotFound("Dish"));
    }
    if let Some(key) = dish.image_key {
        if let Err(e) = state.storage.delete_object(&key).await {
            warn!(error = %e, %key, "dish image delete failed");
        }
    }
    Ok(())
}

/// POST /dishes/:id/image (multipart, field `file`)
#[instrument(skip(state, mp))]
pub async fn upload_dish_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    mut mp: Multipart,
) -> AppResult<Json<DishResponse>> {
    let dish = owned_dish(&state, user_id, id).await?;

    let mut upload: Option<(Bytes, String)> = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(e.to_string()))?;
        upload = Some((data, content_type));
        break;
    }
    let (body, content_type) = upload.ok_or_else(|| AppError::bad_request("file is required"))?;
    let ext = ext_from_mime(&content_type)
        .ok_or_else(|| AppError::bad_request(format!("Unsupported image type {}", content_type)))?;

    let key = format!("dishes/{}/{}.{}", dish.id, Uuid::new_v4(), ext);
    state
        .storage
        .put_object(&key, body, &content_type)
        .await
        .map_err(|e| {
            error!(error = %e, %key, "dish image upload failed");
            AppError::Internal(e)
        })?;
    repo::set_image_key(&state.db, dish.id, Some(&key)).await?;

    if let Some(old) = dish.image_key.as_deref() {
        if let Err(e) = state.storage.delete_object(old).await {
            warn!(error = %e, key = %old, "old dish image delete failed");
        }
    }

    info!(%user_id, dish_id = %id, %key, "dish image stored");
    let dish = repo::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Dish"))?;
    Ok(Json(dish.into()))
}

/// 302 to a short-lived presigned URL of the dish image.
#[instrument(skip(state))]
pub async fn get_dish_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let dish = visible_dish(&state, user_id, id).await?;
    let key = dish.image_key.ok_or(AppError::NotFound("Dish image"))?;
    let url = state.storage.presign_get(&key, IMAGE_URL_TTL_SECS).await?;
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]))
}
