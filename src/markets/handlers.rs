use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{MarketRequest, NearbyQuery},
    repo,
    repo_types::Market,
    services::{bounding_box, nearby, NearbyMarket},
};
use crate::{
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/markets", get(list_markets))
        .route("/markets/nearby", get(nearby_markets))
}

/// Mounted under `/admin`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/markets", post(create_market))
        .route("/markets/:id", delete(delete_market))
}

#[instrument(skip(state))]
pub async fn list_markets(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> AppResult<Json<Vec<Market>>> {
    Ok(Json(repo::list(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn nearby_markets(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<NearbyQuery>,
) -> AppResult<Json<Vec<NearbyMarket>>> {
    let (origin, radius, mode) = q.resolve().map_err(|e| {
        warn!(error = %e, "nearby search rejected");
        AppError::BadRequest(e)
    })?;
    let candidates = match bounding_box(origin, radius) {
        Some((lat_min, lat_max, lng_min, lng_max)) => {
            repo::list_in_box(&state.db, lat_min, lat_max, lng_min, lng_max).await?
        }
        None => repo::list(&state.db).await?,
    };
    Ok(Json(nearby(candidates, origin, radius, mode)))
}

#[instrument(skip(state, admin, body))]
pub async fn create_market(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(body): Json<MarketRequest>,
) -> AppResult<(StatusCode, Json<Market>)> {
    let body = body.validate().map_err(AppError::BadRequest)?;
    let row = repo::insert(&state.db, &body).await?;
    info!(admin_id = %admin.id, market_id = %row.id, "market added");
    Ok((StatusCode::CREATED, Json(row)))
}

#[instrument(skip(state, admin))]
pub async fn delete_market(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Market"));
    }
    info!(admin_id = %admin.id, %id, "market deleted");
    Ok(StatusCode::NO_CONTENT)
}
