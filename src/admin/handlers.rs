use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{Overview, RoleRequest},
    repo,
};
use crate::{
    auth::{repo_types::User, AdminUser},
    dishes::{
        self,
        dto::DishResponse,
        handlers::remove_dish,
        repo::{DishFilter, Visibility},
    },
    error::{AppError, AppResult},
    params::Pagination,
    state::AppState,
    stock::{
        self,
        dto::AlertQuery,
        handlers::{collect_alerts, expiry_window},
        services::{classify, StockAlert},
    },
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/overview", get(overview))
        .route("/users", get(list_users))
        .route("/users/:id/role", put(set_role))
        .route("/dishes/pending", get(pending_dishes))
        .route("/dishes/:id/approve", post(approve_dish))
        .route("/dishes/:id", delete(delete_dish))
        .route("/stock/alerts", get(all_stock_alerts))
}

#[instrument(skip(state, _admin))]
pub async fn overview(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Overview>> {
    let mut stats = repo::counts(&state.db).await?;
    let items = stock::repo::list_all(&state.db).await?;
    stats.stock_needing_attention = items
        .iter()
        .filter(|i| classify(i.current_stock, i.min_stock, i.max_stock).needs_attention())
        .count() as i64;
    Ok(Json(stats))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Vec<User>>> {
    let (limit, offset) = p.clamped();
    Ok(Json(repo::list_users(&state.db, limit, offset).await?))
}

#[instrument(skip(state, admin, body))]
pub async fn set_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RoleRequest>,
) -> AppResult<Json<User>> {
    let role = body.validate().map_err(AppError::BadRequest)?;
    if id == admin.id && role != admin.role.as_str() {
        warn!(admin_id = %admin.id, "admin tried to change own role");
        return Err(AppError::Conflict("Admins cannot change their own role".into()));
    }
    let user = repo::set_role(&state.db, id, role)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    info!(admin_id = %admin.id, user_id = %id, role, "user role changed");
    Ok(Json(user))
}

#[instrument(skip(state, _admin))]
pub async fn pending_dishes(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Vec<DishResponse>>> {
    let (limit, offset) = p.clamped();
    let rows = dishes::repo::list(
        &state.db,
        Visibility::Pending,
        &DishFilter::default(),
        limit,
        offset,
    )
    .await?;
    Ok(Json(rows.into_iter().map(DishResponse::from).collect()))
}

#[instrument(skip(state, admin))]
pub async fn approve_dish(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DishResponse>> {
    let dish = dishes::repo::set_approved(&state.db, id, true)
        .await?
        .ok_or(AppError::NotFound("Dish"))?;
    info!(admin_id = %admin.id, dish_id = %id, "dish approved");
    Ok(Json(dish.into()))
}

#[instrument(skip(state, admin))]
pub async fn delete_dish(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let dish = dishes::repo::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Dish"))?;
    remove_dish(&state, dish).await?;
    info!(admin_id = %admin.id, dish_id = %id, "dish removed by admin");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, _admin))]
pub async fn all_stock_alerts(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(q): Query<AlertQuery>,
) -> AppResult<Json<Vec<StockAlert>>> {
    let window = expiry_window(&q)?;
    let items = stock::repo::list_all(&state.db).await?;
    Ok(Json(collect_alerts(&items, window)))
}
