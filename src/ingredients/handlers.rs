use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{IngredientQuery, IngredientRequest},
    repo,
    repo_types::Ingredient,
};
use crate::{
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/ingredients", get(list_ingredients))
}

/// Mounted under `/admin`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", post(create_ingredient))
        .route(
            "/ingredients/:id",
            put(update_ingredient).delete(delete_ingredient),
        )
}

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<IngredientQuery>,
) -> AppResult<Json<Vec<Ingredient>>> {
    let category = q.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
    Ok(Json(repo::list(&state.db, category).await?))
}

#[instrument(skip(state, admin, body))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(body): Json<IngredientRequest>,
) -> AppResult<(StatusCode, Json<Ingredient>)> {
    let body = body.validate().map_err(AppError::BadRequest)?;
    if repo::name_taken(&state.db, &body.name, None).await? {
        return Err(AppError::Conflict(format!("Ingredient '{}' already exists", body.name)));
    }
    let row = repo::insert(&state.db, &body).await?;
    info!(admin_id = %admin.id, ingredient = %row.name, "ingredient added");
    Ok((StatusCode::CREATED, Json(row)))
}

#[instrument(skip(state, admin, body))]
pub async fn update_ingredient(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<IngredientRequest>,
) -> AppResult<Json<Ingredient>> {
    let body = body.validate().map_err(AppError::BadRequest)?;
    if repo::name_taken(&state.db, &body.name, Some(id)).await? {
        return Err(AppError::Conflict(format!("Ingredient '{}' already exists", body.name)));
    }
    let row = repo::update(&state.db, id, &body)
        .await?
        .ok_or(AppError::NotFound("Ingredient"))?;
    info!(admin_id = %admin.id, ingredient = %row.name, "ingredient updated");
    Ok(Json(row))
}

#[instrument(skip(state, admin))]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Ingredient"));
    }
    info!(admin_id = %admin.id, %id, "ingredient deleted");
    Ok(StatusCode::NO_CONTENT)
}
